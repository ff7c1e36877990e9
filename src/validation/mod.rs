//! Transaction validation
//!
//! Evaluates a submission against a fixed decision table. Rules run in a
//! fixed order and the first failing rule decides the outcome: format checks,
//! then the denylist, then amount-based limits, and the two stochastic fault
//! injections last. A rejection is a normal [`Verdict`], not an error.

mod denylist;
mod ifsc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::{PaymentChannel, TransactionRequest};
use crate::random::{RandomSource, RandomSourceError};

pub use denylist::{Denylist, DEFAULT_BLOCKED_ACCOUNTS};
pub use ifsc::{is_valid_ifsc, normalize_ifsc};

/// Amounts at or above this are flagged for AML review
pub const AML_FLAG_THRESHOLD: Decimal = dec!(100000);
/// Amounts at or above this are high value
pub const HIGH_VALUE_THRESHOLD: Decimal = dec!(200000);
/// Amounts at or above this are held for compliance
pub const COMPLIANCE_HOLD_THRESHOLD: Decimal = dec!(1000000);
/// IMPS per-transaction ceiling (inclusive)
pub const IMPS_MAX_AMOUNT: Decimal = dec!(500000);
/// RTGS per-transaction floor (inclusive)
pub const RTGS_MIN_AMOUNT: Decimal = dec!(200000);
/// Insufficient-funds injection only applies above this amount
pub const INSUFFICIENT_FUNDS_MIN_AMOUNT: Decimal = dec!(50000);

/// Why a submission was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    InvalidIfsc,
    AccountBlocked,
    InvalidAmount,
    ComplianceHold,
    LimitExceeded,
    BelowRtgsMinimum,
    NetworkTimeout,
    InsufficientFunds,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidIfsc => "Invalid IFSC code",
            Self::AccountBlocked => "Account blocked",
            Self::InvalidAmount => "Invalid amount",
            Self::ComplianceHold => "AML compliance hold",
            Self::LimitExceeded => "Transaction limit exceeded",
            Self::BelowRtgsMinimum => "Amount below RTGS minimum limit",
            Self::NetworkTimeout => "Network timeout",
            Self::InsufficientFunds => "Insufficient funds",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk flags computed from the amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskFlags {
    pub aml_flag: bool,
    pub high_value: bool,
}

impl RiskFlags {
    pub fn for_amount(amount: Decimal) -> Self {
        Self {
            aml_flag: amount >= AML_FLAG_THRESHOLD,
            high_value: amount >= HIGH_VALUE_THRESHOLD,
        }
    }
}

/// Outcome of [`Validator::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub failure_reason: Option<RejectionReason>,
    pub flags: RiskFlags,
}

impl Verdict {
    pub fn accept(flags: RiskFlags) -> Self {
        Self {
            failure_reason: None,
            flags,
        }
    }

    pub fn reject(reason: RejectionReason, flags: RiskFlags) -> Self {
        Self {
            failure_reason: Some(reason),
            flags,
        }
    }

    pub fn accepted(&self) -> bool {
        self.failure_reason.is_none()
    }
}

/// Simulated infrastructure faults applied after the deterministic rules
#[derive(Debug, Clone, PartialEq)]
pub struct FaultInjection {
    pub enabled: bool,
    /// Probability of "Network timeout" on any submission
    pub network_failure_rate: f64,
    /// Probability of "Insufficient funds" above [`INSUFFICIENT_FUNDS_MIN_AMOUNT`]
    pub insufficient_funds_rate: f64,
}

impl FaultInjection {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for FaultInjection {
    fn default() -> Self {
        Self {
            enabled: true,
            network_failure_rate: 0.05,
            insufficient_funds_rate: 0.10,
        }
    }
}

/// Rule engine for transaction submissions
pub struct Validator {
    denylist: Denylist,
    faults: FaultInjection,
    random: Arc<dyn RandomSource>,
}

impl Validator {
    pub fn new(denylist: Denylist, faults: FaultInjection, random: Arc<dyn RandomSource>) -> Self {
        Self {
            denylist,
            faults,
            random,
        }
    }

    pub fn evaluate_request(&self, request: &TransactionRequest) -> Result<Verdict, RandomSourceError> {
        self.evaluate(
            &request.sender,
            &request.receiver,
            request.amount,
            request.channel,
            &request.ifsc,
        )
    }

    /// Run the decision table. Only a failing random source produces `Err`.
    pub fn evaluate(
        &self,
        sender: &str,
        receiver: &str,
        amount: Decimal,
        channel: PaymentChannel,
        ifsc: &str,
    ) -> Result<Verdict, RandomSourceError> {
        if !is_valid_ifsc(&normalize_ifsc(ifsc)) {
            return Ok(Verdict::reject(RejectionReason::InvalidIfsc, RiskFlags::default()));
        }

        if self.denylist.is_blocked(sender) || self.denylist.is_blocked(receiver) {
            return Ok(Verdict::reject(RejectionReason::AccountBlocked, RiskFlags::default()));
        }

        if amount <= Decimal::ZERO {
            return Ok(Verdict::reject(RejectionReason::InvalidAmount, RiskFlags::default()));
        }

        let flags = RiskFlags::for_amount(amount);

        if amount >= COMPLIANCE_HOLD_THRESHOLD {
            return Ok(Verdict::reject(RejectionReason::ComplianceHold, flags));
        }

        match channel {
            PaymentChannel::Imps if amount > IMPS_MAX_AMOUNT => {
                return Ok(Verdict::reject(RejectionReason::LimitExceeded, flags));
            }
            PaymentChannel::Rtgs if amount < RTGS_MIN_AMOUNT => {
                return Ok(Verdict::reject(RejectionReason::BelowRtgsMinimum, flags));
            }
            _ => {}
        }

        if let Some(reason) = self.inject_fault(amount)? {
            return Ok(Verdict::reject(reason, flags));
        }

        Ok(Verdict::accept(flags))
    }

    fn inject_fault(&self, amount: Decimal) -> Result<Option<RejectionReason>, RandomSourceError> {
        if !self.faults.enabled {
            return Ok(None);
        }

        if self.random.next_unit()? < self.faults.network_failure_rate {
            return Ok(Some(RejectionReason::NetworkTimeout));
        }

        // Draw only above the threshold so small payments consume a single value
        if amount > INSUFFICIENT_FUNDS_MIN_AMOUNT
            && self.random.next_unit()? < self.faults.insufficient_funds_rate
        {
            return Ok(Some(RejectionReason::InsufficientFunds));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedRandom, ScriptedRandom};

    const IFSC: &str = "HDFC0ABC123";

    fn validator() -> Validator {
        Validator::new(
            Denylist::with_defaults(),
            FaultInjection::disabled(),
            Arc::new(FixedRandom(0.99)),
        )
    }

    fn faulty(random: Arc<dyn RandomSource>) -> Validator {
        Validator::new(Denylist::with_defaults(), FaultInjection::default(), random)
    }

    fn neft(v: &Validator, amount: Decimal) -> Verdict {
        v.evaluate("ACME", "GLOBEX", amount, PaymentChannel::Neft, IFSC).unwrap()
    }

    #[test]
    fn test_ifsc_checked_first() {
        let v = validator();
        let verdict = v
            .evaluate("FRAUD_USER", "GLOBEX", dec!(-5), PaymentChannel::Imps, "HDFC1ABC123")
            .unwrap();
        assert_eq!(verdict.failure_reason, Some(RejectionReason::InvalidIfsc));
        assert_eq!(verdict.flags, RiskFlags::default());
    }

    #[test]
    fn test_ifsc_is_case_insensitive() {
        let verdict = validator()
            .evaluate("ACME", "GLOBEX", dec!(100), PaymentChannel::Imps, "hdfc0abc123")
            .unwrap();
        assert!(verdict.accepted());
    }

    #[test]
    fn test_blocked_party_precedes_amount_rules() {
        let v = validator();
        for (sender, receiver) in [("fraud_user", "GLOBEX"), ("ACME", "Fraud_User")] {
            let verdict = v
                .evaluate(sender, receiver, dec!(0), PaymentChannel::Neft, IFSC)
                .unwrap();
            assert_eq!(verdict.failure_reason, Some(RejectionReason::AccountBlocked));
        }
    }

    #[test]
    fn test_non_positive_amounts_rejected_before_random_draws() {
        // An exhausted source proves no stochastic rule is reached
        let v = faulty(Arc::new(ScriptedRandom::new([])));
        for amount in [dec!(0), dec!(-0.01), dec!(-250000)] {
            let verdict = neft(&v, amount);
            assert_eq!(verdict.failure_reason, Some(RejectionReason::InvalidAmount));
            assert_eq!(verdict.flags, RiskFlags::default());
        }
    }

    #[test]
    fn test_aml_band_flags() {
        let v = validator();
        for amount in [dec!(100000), dec!(150000.75), dec!(199999.99)] {
            let verdict = neft(&v, amount);
            assert!(verdict.accepted());
            assert!(verdict.flags.aml_flag);
            assert!(!verdict.flags.high_value);
        }
        assert!(!neft(&v, dec!(99999.99)).flags.aml_flag);
    }

    #[test]
    fn test_high_value_band_flags() {
        let v = validator();
        for amount in [dec!(200000), dec!(500000), dec!(999999.99)] {
            let verdict = neft(&v, amount);
            assert!(verdict.accepted());
            assert!(verdict.flags.aml_flag);
            assert!(verdict.flags.high_value);
        }
    }

    #[test]
    fn test_compliance_hold_reports_flags() {
        let v = validator();
        for channel in PaymentChannel::ALL {
            let verdict = v
                .evaluate("ACME", "GLOBEX", dec!(1000000), channel, IFSC)
                .unwrap();
            assert_eq!(verdict.failure_reason, Some(RejectionReason::ComplianceHold));
            assert_eq!(verdict.failure_reason.unwrap().as_str(), "AML compliance hold");
            assert!(verdict.flags.aml_flag);
            assert!(verdict.flags.high_value);
        }
    }

    #[test]
    fn test_imps_ceiling() {
        let v = validator();
        let over = v
            .evaluate("ACME", "GLOBEX", dec!(500001), PaymentChannel::Imps, IFSC)
            .unwrap();
        assert_eq!(over.failure_reason, Some(RejectionReason::LimitExceeded));
        assert!(over.flags.high_value);

        let at = v
            .evaluate("ACME", "GLOBEX", dec!(500000), PaymentChannel::Imps, IFSC)
            .unwrap();
        assert!(at.accepted());
    }

    #[test]
    fn test_rtgs_floor() {
        let v = validator();
        let under = v
            .evaluate("ACME", "GLOBEX", dec!(199999), PaymentChannel::Rtgs, IFSC)
            .unwrap();
        assert_eq!(under.failure_reason, Some(RejectionReason::BelowRtgsMinimum));
        assert_eq!(
            under.failure_reason.unwrap().to_string(),
            "Amount below RTGS minimum limit"
        );

        let at = v
            .evaluate("ACME", "GLOBEX", dec!(200000), PaymentChannel::Rtgs, IFSC)
            .unwrap();
        assert!(at.accepted());
    }

    #[test]
    fn test_network_timeout_injection() {
        let v = faulty(Arc::new(ScriptedRandom::new([0.01])));
        let verdict = neft(&v, dec!(100));
        assert_eq!(verdict.failure_reason, Some(RejectionReason::NetworkTimeout));
        assert!(!verdict.flags.aml_flag);
    }

    #[test]
    fn test_insufficient_funds_only_above_threshold() {
        // Small payment: one draw, never insufficient funds
        let source = Arc::new(ScriptedRandom::new([0.5, 0.01]));
        let v = faulty(source.clone());
        assert!(neft(&v, dec!(50000)).accepted());
        assert_eq!(source.remaining(), 1);

        let v = faulty(Arc::new(ScriptedRandom::new([0.5, 0.01])));
        assert_eq!(
            neft(&v, dec!(50000.01)).failure_reason,
            Some(RejectionReason::InsufficientFunds)
        );
    }

    #[test]
    fn test_faults_pass_with_high_draws() {
        let v = faulty(Arc::new(FixedRandom(0.99)));
        let verdict = neft(&v, dec!(75000));
        assert!(verdict.accepted());
        assert!(verdict.failure_reason.is_none());
    }

    #[test]
    fn test_deterministic_rules_precede_injection() {
        let v = faulty(Arc::new(FixedRandom(0.0)));
        let verdict = v
            .evaluate("ACME", "GLOBEX", dec!(600000), PaymentChannel::Imps, IFSC)
            .unwrap();
        assert_eq!(verdict.failure_reason, Some(RejectionReason::LimitExceeded));
    }

    #[test]
    fn test_random_source_failure_is_an_error() {
        let v = faulty(Arc::new(ScriptedRandom::new([])));
        let result = v.evaluate("ACME", "GLOBEX", dec!(100), PaymentChannel::Neft, IFSC);
        assert_eq!(result, Err(RandomSourceError::Exhausted));
    }

    #[test]
    fn test_custom_denylist() {
        let v = Validator::new(
            Denylist::new(["MULE"]),
            FaultInjection::disabled(),
            Arc::new(FixedRandom(0.5)),
        );
        assert!(neft(&v, dec!(10)).accepted());
        let verdict = v
            .evaluate("mule", "GLOBEX", dec!(10), PaymentChannel::Neft, IFSC)
            .unwrap();
        assert_eq!(verdict.failure_reason, Some(RejectionReason::AccountBlocked));
    }
}
