//! Shared fixtures for unit tests.

use alloy_primitives::hex;
use post_office_primitives::{
    CashAddress, Hash160, OutPoint, PrimitivesError, Script, SighashType, Transaction, TxIn, TxOut,
    Txid,
};
use rust_decimal::Decimal;

use crate::{AcceptedStamp, InputSigner, PostageRate, TokenId};

pub(crate) const TOKEN: &str = "38e97c5d7d3585a2cbf3f9580c82ca33985f9cb0845d4dcce220cb709f9538b0";

pub(crate) const SERVER_HASH: Hash160 = hex!("95ee39ad723020d9887e4132677fe827fe9bd467");
pub(crate) const SERVER_SLP_ADDRESS: &str =
    "simpleledger:qz27uwddwgczpkvg0eqnyemlaqnlax75vuqte26mpx";
pub(crate) const OTHER_HASH: Hash160 = hex!("7f79ad91bf688c62d545c4ca1c8cb1d704caf3dd");

/// `SEND` of the accepted token, 150000000000 base units to output 1.
pub(crate) const VALID_METADATA: &str = "6a04534c5000510453454e442038e97c5d7d3585a2cbf3f9580c82ca33985f9cb0845d4dcce220cb709f9538b00800000022ecb25c000800007eb55317a5b2";
/// `SEND` of the accepted token, 22 base units to output 1.
pub(crate) const UNDERPAID_METADATA: &str = "6a04534c5000510453454e442038e97c5d7d3585a2cbf3f9580c82ca33985f9cb0845d4dcce220cb709f9538b001160800007eb55317a5b2";
/// `SEND` of a token the post office does not accept.
pub(crate) const UNSUPPORTED_METADATA: &str = "6a04534c500001010453454e44204de69e374a8ed21cbddd47f2338cc0f479dc58daa2bbe11cd604ca488eca0ddf0800000022ecb25c000800007eb55317a5b2";
/// Lokad id `534c5001`.
pub(crate) const BAD_LOKAD_METADATA: &str = "6a04534c5001510453454e44204de69e374a8ed21cbddd47f2338cc0f479dc58daa2bbe11cd604ca488eca0ddf0800000022ecb25c000800007eb55317a5b2";

pub(crate) fn token_id() -> TokenId {
    TOKEN.parse().unwrap()
}

pub(crate) fn server_cash_address() -> CashAddress {
    CashAddress::p2pkh("bitcoincash", SERVER_HASH)
}

/// One accepted token priced at one whole token per stamp, six decimals.
pub(crate) fn postage_rate() -> PostageRate {
    PostageRate {
        version: 1,
        address: SERVER_SLP_ADDRESS.to_string(),
        weight: 365,
        transaction_ttl: None,
        stamps: vec![AcceptedStamp {
            name: "Test Token".to_string(),
            symbol: "TEST".to_string(),
            token_id: token_id(),
            decimals: 6,
            rate: Decimal::ONE,
        }],
    }
}

/// A pre-signed sender transaction paying output 1 to the post office.
pub(crate) fn slp_transaction(metadata: &str, inputs: usize) -> Transaction {
    slp_transaction_to(metadata, SERVER_HASH, inputs)
}

/// A pre-signed sender transaction with metadata, a token output to `payee`
/// and a token output to someone else.
pub(crate) fn slp_transaction_to(metadata: &str, payee: Hash160, inputs: usize) -> Transaction {
    let mut tx = Transaction::new(2);
    for i in 0..inputs {
        let mut input = TxIn::unsigned(OutPoint::new(Txid::new([0xa0 + i as u8; 32]), 1));
        input.script_sig = Script::builder().push(&[0x30; 71]).push(&[0x02; 33]).into_script();
        tx.inputs.push(input);
    }
    tx.outputs.push(TxOut::new(0, Script::new(hex::decode(metadata).unwrap())));
    tx.outputs.push(TxOut::new(546, Script::p2pkh(&payee)));
    tx.outputs.push(TxOut::new(546, Script::p2pkh(&OTHER_HASH)));
    tx
}

/// Signs with the real signature hash but a fake key: the unlocking script
/// pushes `digest || hash_type` and the server hash.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TestSigner;

impl InputSigner for TestSigner {
    type Error = PrimitivesError;

    fn address(&self) -> CashAddress {
        server_cash_address()
    }

    fn sign_input(
        &self,
        transaction: &Transaction,
        index: usize,
        value: u64,
        sighash_type: SighashType,
    ) -> Result<Script, Self::Error> {
        let digest = transaction.signature_hash(index, &self.locking_script(), value, sighash_type)?;
        let mut signature = digest.to_vec();
        signature.push(sighash_type.to_byte());
        Ok(Script::builder().push(&signature).push(&SERVER_HASH).into_script())
    }
}

/// Reads the digest a [`TestSigner`] unlocking script committed to.
pub(crate) fn signed_digest(script_sig: &Script) -> Vec<u8> {
    let tokens = script_sig.tokens().unwrap();
    let signature = tokens[0].data().unwrap();
    signature[..32].to_vec()
}

/// A sender transaction paying `paid` base units of the accepted token to the
/// post office at output 1, with one more token output to someone else.
pub(crate) fn paying_transaction(paid: u64, inputs: usize) -> Transaction {
    let send = Script::op_return([
        &crate::LOKAD_ID[..],
        &[1][..],
        &b"SEND"[..],
        token_id().as_b256().as_slice(),
        &paid.to_be_bytes()[..],
        &1u64.to_be_bytes()[..],
    ]);
    let mut tx = slp_transaction(VALID_METADATA, inputs);
    tx.outputs[0].script_pubkey = send;
    tx
}

/// [`postage_rate`] with the accepted token repriced.
pub(crate) fn postage_rate_at(rate: Decimal, decimals: u32) -> PostageRate {
    let mut postage = postage_rate();
    postage.stamps[0].rate = rate;
    postage.stamps[0].decimals = decimals;
    postage
}
