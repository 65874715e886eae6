//! Shared fixtures for service tests.

use post_office_networks::NamedNetwork;
use post_office_postage::{AcceptedStamp, InputSigner, PostageRate, TokenId, UnspentOutput};
use post_office_primitives::{OutPoint, Script, Transaction, TxIn, TxOut, Txid};
use post_office_signer::LocalSigner;
use tracing_subscriber::EnvFilter;

pub(crate) const TOKEN: &str = "38e97c5d7d3585a2cbf3f9580c82ca33985f9cb0845d4dcce220cb709f9538b0";

const PHRASE: &str = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon about";

const OTHER_HASH: [u8; 20] = alloy_primitives::hex!("7f79ad91bf688c62d545c4ca1c8cb1d704caf3dd");

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn mnemonic_signer() -> LocalSigner {
    LocalSigner::from_mnemonic(PHRASE, NamedNetwork::Mainnet).unwrap()
}

/// One whole token (six decimals) per stamp, paid to the signer's SLP address.
pub(crate) fn postage_rate() -> PostageRate {
    PostageRate {
        version: 1,
        address: mnemonic_signer().address().with_prefix("simpleledger").to_string(),
        weight: 365,
        transaction_ttl: None,
        stamps: vec![AcceptedStamp {
            name: "Test Token".to_string(),
            symbol: "TEST".to_string(),
            token_id: TOKEN.parse().unwrap(),
            decimals: 6,
            rate: 1.into(),
        }],
    }
}

/// A bare 546 satoshi output.
pub(crate) fn stamp_utxo(tag: u8) -> UnspentOutput {
    UnspentOutput::new(Txid::new([0x10 + tag; 32]), 0, 546, 629_922)
}

/// A pre-signed sender transaction sending `amount` token base units to the
/// post office at output 1 and one base unit to someone else at output 2.
pub(crate) fn paying_transaction(amount: u64, inputs: u8) -> Transaction {
    let token_id: TokenId = TOKEN.parse().unwrap();
    let amount = amount.to_be_bytes();
    let change = 1u64.to_be_bytes();
    let pushes: [&[u8]; 6] = [
        &b"SLP\0"[..],
        &[0x01][..],
        &b"SEND"[..],
        token_id.as_b256().as_slice(),
        &amount[..],
        &change[..],
    ];

    let mut tx = Transaction::new(2);
    for i in 0..inputs {
        let mut input = TxIn::unsigned(OutPoint::new(Txid::new([0xa0 + i; 32]), 1));
        input.script_sig = Script::builder().push(&[0x30; 71]).push(&[0x02; 33]).into_script();
        tx.inputs.push(input);
    }
    tx.outputs.push(TxOut::new(0, Script::op_return(pushes)));
    tx.outputs.push(TxOut::new(546, mnemonic_signer().locking_script()));
    tx.outputs.push(TxOut::new(546, Script::p2pkh(&OTHER_HASH)));
    tx
}
