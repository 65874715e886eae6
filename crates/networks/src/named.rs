//! Named Bitcoin Cash network definitions.

use core::fmt;
use num_enum::TryFromPrimitiveError;

/// A named Bitcoin Cash network.
///
/// The discriminant is the network's message-start magic read big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum::IntoStaticStr)]
#[derive(strum::VariantNames)]
#[derive(strum::VariantArray)]
#[derive(strum::EnumString)]
#[derive(strum::EnumIter)]
#[derive(strum::EnumCount)]
#[derive(num_enum::TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u32)]
#[non_exhaustive]
pub enum NamedNetwork {
    /// Bitcoin Cash mainnet.
    #[strum(to_string = "mainnet")]
    Mainnet = 0xe3e1_f3e8,

    /// Bitcoin Cash testnet.
    #[strum(to_string = "testnet")]
    Testnet = 0xf4e5_f3f4,

    /// Local regression test network.
    #[strum(to_string = "regtest")]
    Regtest = 0xdab5_bffa,
}

impl Default for NamedNetwork {
    #[inline]
    fn default() -> Self {
        Self::Mainnet
    }
}

macro_rules! impl_into_numeric {
    ($($t:ty)+) => {$(
        impl From<NamedNetwork> for $t {
            #[inline]
            fn from(network: NamedNetwork) -> Self {
                network as $t
            }
        }
    )+};
}

impl_into_numeric!(u32 u64 i64 u128 i128);

impl TryFrom<[u8; 4]> for NamedNetwork {
    type Error = TryFromPrimitiveError<Self>;

    #[inline]
    fn try_from(magic: [u8; 4]) -> Result<Self, Self::Error> {
        u32::from_be_bytes(magic).try_into()
    }
}

impl fmt::Display for NamedNetwork {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl AsRef<str> for NamedNetwork {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NamedNetwork {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_ref())
    }
}

impl NamedNetwork {
    /// Returns the string representation of the network.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Returns true if this is mainnet.
    #[inline]
    pub const fn is_mainnet(&self) -> bool {
        matches!(self, Self::Mainnet)
    }

    /// Returns the CashAddr prefix of plain Bitcoin Cash addresses.
    #[inline]
    pub const fn cash_prefix(&self) -> &'static str {
        match self {
            Self::Mainnet => "bitcoincash",
            Self::Testnet => "bchtest",
            Self::Regtest => "bchreg",
        }
    }

    /// Returns the CashAddr prefix of SLP token addresses.
    #[inline]
    pub const fn slp_prefix(&self) -> &'static str {
        match self {
            Self::Mainnet => "simpleledger",
            Self::Testnet => "slptest",
            Self::Regtest => "slpreg",
        }
    }

    /// Returns the network owning a CashAddr prefix, in either form.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "bitcoincash" | "simpleledger" => Some(Self::Mainnet),
            "bchtest" | "slptest" => Some(Self::Testnet),
            "bchreg" | "slpreg" => Some(Self::Regtest),
            _ => None,
        }
    }

    /// Returns the message-start bytes of the peer-to-peer protocol.
    #[inline]
    pub const fn magic(&self) -> [u8; 4] {
        (*self as u32).to_be_bytes()
    }
}
