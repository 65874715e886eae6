//! Postage rate configuration.
//!
//! The rate is published to wallets as JSON so they can add the right token
//! payment before handing a transaction to the post office:
//!
//! ```json
//! {
//!   "version": 1,
//!   "address": "simpleledger:qz27uwddwgczpkvg0eqnyemlaqnlax75vuqte26mpx",
//!   "weight": 365,
//!   "transactionttl": 30,
//!   "stamps": [
//!     {
//!       "name": "Spice",
//!       "symbol": "SPICE",
//!       "tokenId": "4de69e374a8ed21cbddd47f2338cc0f479dc58daa2bbe11cd604ca488eca0ddf",
//!       "decimals": 8,
//!       "rate": 0.1
//!     }
//!   ]
//! }
//! ```

use post_office_primitives::CashAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MIN_BYTES_INPUT, PostageError, TokenId};

/// Largest power of ten a `Decimal` can scale by.
const MAX_DECIMALS: u32 = 28;

/// The postage price list of a post office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostageRate {
    /// Schema version.
    pub version: u32,
    /// Where wallets send postage, usually in SLP form.
    pub address: String,
    /// Bytes of fee each stamp pays for.
    pub weight: u64,
    /// Seconds a wallet may hold a quoted rate.
    #[serde(default, rename = "transactionttl", skip_serializing_if = "Option::is_none")]
    pub transaction_ttl: Option<u64>,
    /// Tokens accepted as postage.
    pub stamps: Vec<AcceptedStamp>,
}

/// A token accepted as postage and its price per stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedStamp {
    /// Token name.
    #[serde(default)]
    pub name: String,
    /// Token ticker.
    #[serde(default)]
    pub symbol: String,
    /// Token id.
    // Keys read from the environment arrive lowercased.
    #[serde(alias = "tokenid")]
    pub token_id: TokenId,
    /// Decimal places of the token.
    pub decimals: u32,
    /// Tokens per stamp, in whole tokens.
    pub rate: Decimal,
}

impl AcceptedStamp {
    /// Returns the price of one stamp in token base units, `rate * 10^decimals`.
    ///
    /// The price is exact and may be fractional; only the stamp count derived
    /// from it is rounded.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::Config`] if the price is not positive or does
    /// not fit.
    pub fn stamp_rate(&self) -> Result<Decimal, PostageError> {
        if self.decimals > MAX_DECIMALS {
            return Err(PostageError::Config("token decimals above 28"));
        }
        let scale = Decimal::from_i128_with_scale(10i128.pow(self.decimals), 0);
        let scaled = self
            .rate
            .checked_mul(scale)
            .ok_or(PostageError::Config("stamp rate overflows"))?;

        if scaled.is_zero() {
            return Err(PostageError::Config("stamp rate is zero"));
        }
        if scaled.is_sign_negative() {
            return Err(PostageError::Config("stamp rate is negative"));
        }
        Ok(scaled.normalize())
    }
}

impl PostageRate {
    /// Returns the accepted stamp for `token_id`.
    ///
    /// When several entries share an id the last one wins.
    pub fn stamp(&self, token_id: &TokenId) -> Option<&AcceptedStamp> {
        self.stamps.iter().rev().find(|stamp| &stamp.token_id == token_id)
    }

    /// Returns the receiving address.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::Config`] if the address does not parse.
    pub fn receiving_address(&self) -> Result<CashAddress, PostageError> {
        self.address
            .parse()
            .map_err(|_| PostageError::Config("receiving address is not a valid CashAddr"))
    }

    /// Returns the value of one stamp output, `weight + MIN_BYTES_INPUT`.
    #[inline]
    pub const fn stamp_value(&self) -> u64 {
        self.weight.saturating_add(MIN_BYTES_INPUT)
    }

    /// Checks that the receiving address parses and every stamp is priced.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), PostageError> {
        self.receiving_address()?;
        if self.weight == 0 {
            return Err(PostageError::Config("stamp weight is zero"));
        }
        if self.stamps.is_empty() {
            return Err(PostageError::Config("no accepted stamps"));
        }
        for stamp in &self.stamps {
            stamp.stamp_rate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::postage_rate;

    fn stamp(rate: Decimal, decimals: u32) -> AcceptedStamp {
        AcceptedStamp {
            name: String::new(),
            symbol: String::new(),
            token_id: TokenId::ZERO,
            decimals,
            rate,
        }
    }

    #[test]
    fn test_stamp_rate_scales_by_decimals() {
        assert_eq!(stamp(Decimal::ONE, 6).stamp_rate().unwrap(), Decimal::from(1_000_000));
        assert_eq!(stamp(Decimal::new(1, 1), 8).stamp_rate().unwrap(), Decimal::from(10_000_000));
        assert_eq!(stamp(Decimal::new(25, 0), 0).stamp_rate().unwrap(), Decimal::from(25));
    }

    #[test]
    fn test_stamp_rate_keeps_fractions() {
        // 0.015 with one decimal is 0.15 base units
        assert_eq!(stamp(Decimal::new(15, 3), 1).stamp_rate().unwrap(), Decimal::new(15, 2));
        assert_eq!(stamp(Decimal::new(1234, 3), 2).stamp_rate().unwrap(), Decimal::new(1234, 1));
        assert_eq!(stamp(Decimal::new(1, 9), 0).stamp_rate().unwrap(), Decimal::new(1, 9));
    }

    #[test]
    fn test_stamp_rate_rejects_zero_and_negative() {
        assert!(matches!(
            stamp(Decimal::ZERO, 6).stamp_rate(),
            Err(PostageError::Config("stamp rate is zero"))
        ));
        assert!(matches!(
            stamp(Decimal::new(-1, 0), 2).stamp_rate(),
            Err(PostageError::Config("stamp rate is negative"))
        ));
        assert!(matches!(stamp(Decimal::ONE, 40).stamp_rate(), Err(PostageError::Config(_))));
    }

    #[test]
    fn test_stamp_value() {
        assert_eq!(postage_rate().stamp_value(), 365 + 181);
    }

    #[test]
    fn test_deserialize_published_shape() {
        let json = r#"{
            "version": 1,
            "address": "simpleledger:qz27uwddwgczpkvg0eqnyemlaqnlax75vuqte26mpx",
            "weight": 365,
            "transactionttl": 30,
            "stamps": [{
                "name": "Spice",
                "symbol": "SPICE",
                "tokenId": "4de69e374a8ed21cbddd47f2338cc0f479dc58daa2bbe11cd604ca488eca0ddf",
                "decimals": 8,
                "rate": 0.1
            }]
        }"#;
        let rate: PostageRate = serde_json::from_str(json).unwrap();
        assert_eq!(rate.transaction_ttl, Some(30));
        assert_eq!(rate.stamps[0].rate, Decimal::new(1, 1));
        assert_eq!(rate.stamps[0].stamp_rate().unwrap(), Decimal::from(10_000_000));
        rate.validate().unwrap();

        let reencoded: PostageRate =
            serde_json::from_str(&serde_json::to_string(&rate).unwrap()).unwrap();
        assert_eq!(reencoded, rate);
    }

    #[test]
    fn test_lookup_last_match_wins() {
        let mut rate = postage_rate();
        let mut cheaper = rate.stamps[0].clone();
        cheaper.rate = Decimal::new(5, 1);
        rate.stamps.push(cheaper);

        let token = crate::test_utils::token_id();
        assert_eq!(rate.stamp(&token).unwrap().rate, Decimal::new(5, 1));
        assert!(rate.stamp(&TokenId::ZERO).is_none());
    }

    #[test]
    fn test_validate() {
        postage_rate().validate().unwrap();

        let mut bad = postage_rate();
        bad.address = "nope".to_string();
        assert!(matches!(bad.validate(), Err(PostageError::Config(_))));

        let mut bad = postage_rate();
        bad.stamps.clear();
        assert!(matches!(bad.validate(), Err(PostageError::Config("no accepted stamps"))));

        let mut bad = postage_rate();
        bad.stamps[0].rate = Decimal::ZERO;
        assert!(matches!(bad.validate(), Err(PostageError::Config("stamp rate is zero"))));
    }
}
