//! Payment channels
//!
//! The three interbank rails a transaction can be submitted on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interbank payment channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentChannel {
    /// Immediate Payment Service
    Imps,
    /// National Electronic Funds Transfer
    Neft,
    /// Real Time Gross Settlement
    Rtgs,
}

impl PaymentChannel {
    pub const ALL: [PaymentChannel; 3] = [Self::Imps, Self::Neft, Self::Rtgs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imps => "IMPS",
            Self::Neft => "NEFT",
            Self::Rtgs => "RTGS",
        }
    }

    /// Human readable description of the rail
    pub fn description(&self) -> &'static str {
        match self {
            Self::Imps => "Immediate Payment Service - 24x7 instant transfer",
            Self::Neft => "National Electronic Funds Transfer - Batch processing",
            Self::Rtgs => "Real Time Gross Settlement - High value real-time",
        }
    }

    /// Typical time until the beneficiary is credited
    pub fn processing_timeline(&self) -> &'static str {
        match self {
            Self::Imps => "2-3 seconds",
            Self::Neft => "30-60 minutes",
            Self::Rtgs => "5-10 minutes",
        }
    }
}

impl fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown payment channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for PaymentChannel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IMPS" => Ok(Self::Imps),
            "NEFT" => Ok(Self::Neft),
            "RTGS" => Ok(Self::Rtgs),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}
