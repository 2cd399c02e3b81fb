//! Templates and random identifiers used by the dashboard simulation

use crate::events::{LogLevel, TransactionKind};
use rand::Rng;

const ADDRESS_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const HEX_ALPHABET: &[u8] = b"0123456789abcdef";

pub const ADDRESS_LEN: usize = 44;
pub const SIGNATURE_LEN: usize = 64;
/// Points kept in a dashboard balance history
pub const BALANCE_HISTORY_LEN: usize = 20;

/// Log messages a simulated agent may emit
pub const LOG_MESSAGE_COUNT: usize = 10;

fn random_string<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Base58-looking account address
pub fn random_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_string(rng, ADDRESS_ALPHABET, ADDRESS_LEN)
}

/// Hex transaction signature
pub fn random_signature<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_string(rng, HEX_ALPHABET, SIGNATURE_LEN)
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Random walk used to pre-fill a balance chart
pub fn balance_history<R: Rng + ?Sized>(rng: &mut R) -> Vec<f64> {
    let mut balance = 0.5 + rng.gen::<f64>() * 1.5;
    (0..BALANCE_HISTORY_LEN)
        .map(|_| {
            balance += (rng.gen::<f64>() - 0.45) * 0.2;
            balance = balance.max(0.01);
            round4(balance)
        })
        .collect()
}

pub fn random_kind<R: Rng + ?Sized>(rng: &mut R) -> TransactionKind {
    TransactionKind::ALL[rng.gen_range(0..TransactionKind::ALL.len())]
}

/// Human-readable description of a simulated transaction of `kind`
pub fn describe<R: Rng + ?Sized>(kind: TransactionKind, rng: &mut R) -> String {
    match kind {
        TransactionKind::Send => format!("Sent {:.3} SOL", rng.gen::<f64>() * 0.09 + 0.01),
        TransactionKind::Receive => format!("Received {:.3} SOL", rng.gen::<f64>() * 0.05 + 0.01),
        TransactionKind::FundRequest => "Airdrop 1 SOL requested".to_string(),
        TransactionKind::Mint => format!("Minted {} AGW tokens", rng.gen_range(100..1_000)),
        TransactionKind::TokenTransfer => format!("Transferred {} AGW", rng.gen_range(50..550)),
        TransactionKind::BalanceCheck => "Balance query".to_string(),
    }
}

/// Message `index` of the log catalog with its level
pub fn log_message<R: Rng + ?Sized>(index: usize, rng: &mut R) -> (String, LogLevel) {
    match index % LOG_MESSAGE_COUNT {
        0 => ("Agent started".to_string(), LogLevel::Info),
        1 => ("Requesting airdrop of 1 SOL".to_string(), LogLevel::Info),
        2 => ("Airdrop confirmed successfully".to_string(), LogLevel::Success),
        3 => ("Sending 0.05 SOL to devnet wallet".to_string(), LogLevel::Info),
        4 => (
            format!("Transaction confirmed: {}...", &random_signature(rng)[..16]),
            LogLevel::Success,
        ),
        5 => ("Balance too low, pausing...".to_string(), LogLevel::Warn),
        6 => ("Retrying failed transaction (1/3)".to_string(), LogLevel::Warn),
        7 => ("RPC rate limit hit, backing off".to_string(), LogLevel::Warn),
        8 => ("Minted 500 AGW tokens successfully".to_string(), LogLevel::Success),
        _ => ("Transaction failed: insufficient funds".to_string(), LogLevel::Error),
    }
}

pub fn random_log_message<R: Rng + ?Sized>(rng: &mut R) -> (String, LogLevel) {
    let index = rng.gen_range(0..LOG_MESSAGE_COUNT);
    log_message(index, rng)
}
