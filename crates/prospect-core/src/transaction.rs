//! Transaction data model: transfers, coinbase awards, UTXO references.

use serde::{Deserialize, Serialize};

use crate::hash::{sha256, Digest};

/// Value in base units.
pub type Amount = u64;

/// An account owner's public key, as opaque text.
///
/// Key generation and signature checking live outside this core; the
/// key only identifies who an output pays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub String);

impl PublicKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PublicKey {
    fn from(s: &str) -> Self {
        PublicKey(s.to_string())
    }
}

/// The two transaction kinds. Every block carries exactly one
/// `Coinbase` transaction, appended last during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Transfer,
    Coinbase,
}

/// A consuming reference to a previously created output (a UTXO).
///
/// The reference does not own the output it names; once a block
/// spending it is accepted, the referenced UTXO is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtxoRef {
    /// Id of the transaction that created the output.
    pub txid: Digest,
    /// Position of the output within that transaction.
    pub index: u32,
}

/// A transaction input: which UTXO it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub utxo: UtxoRef,
}

/// A transaction output: who gets paid how much.
///
/// Its own UTXO identifier is derived from the owning transaction via
/// [`Transaction::output_ref`], never stored redundantly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub recipient: PublicKey,
    pub amount: Amount,
}

/// A transaction with a deterministic content-derived id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Digest,
    pub kind: TransactionKind,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Create an ordinary transfer. The id digests the kind tag, every
    /// consumed UTXO reference and every output, so any validator can
    /// re-derive it.
    pub fn transfer(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = transaction_id(b"transfer", None, &inputs, &outputs);
        Transaction {
            id,
            kind: TransactionKind::Transfer,
            inputs,
            outputs,
        }
    }

    /// Create the coinbase transaction paying the miner.
    ///
    /// Coinbase transactions have no inputs, so the block height is
    /// folded into the id to keep same-payout coinbases at different
    /// heights distinct.
    pub fn coinbase(height: u64, recipient: PublicKey, amount: Amount) -> Self {
        let outputs = vec![TransactionOutput { recipient, amount }];
        let id = transaction_id(b"coinbase", Some(height), &[], &outputs);
        Transaction {
            id,
            kind: TransactionKind::Coinbase,
            inputs: Vec::new(),
            outputs,
        }
    }

    /// The UTXO identifier of this transaction's `index`-th output.
    pub fn output_ref(&self, index: u32) -> UtxoRef {
        UtxoRef {
            txid: self.id,
            index,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.kind == TransactionKind::Coinbase
    }
}

/// Digest the canonical byte form of a transaction's content.
fn transaction_id(
    tag: &[u8],
    height: Option<u64>,
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
) -> Digest {
    let mut buf = Vec::with_capacity(64 + inputs.len() * 36 + outputs.len() * 40);
    buf.extend_from_slice(tag);
    if let Some(h) = height {
        buf.extend_from_slice(&h.to_be_bytes());
    }
    buf.extend_from_slice(&(inputs.len() as u32).to_be_bytes());
    for input in inputs {
        buf.extend_from_slice(&input.utxo.txid);
        buf.extend_from_slice(&input.utxo.index.to_be_bytes());
    }
    buf.extend_from_slice(&(outputs.len() as u32).to_be_bytes());
    for output in outputs {
        let key = output.recipient.as_str().as_bytes();
        buf.extend_from_slice(&(key.len() as u32).to_be_bytes());
        buf.extend_from_slice(key);
        buf.extend_from_slice(&output.amount.to_be_bytes());
    }
    sha256(&buf)
}
