//! # Expectation Adjuster
//!
//! Folds a manual (off-POS) sale into the channel it was paid through.
//!
//! ```text
//!   POS:     cash 1000   upi 500   card 300
//!   Manual:  200 via Cash
//!   ─────────────────────────────────────────
//!   Expect:  cash 1200   upi 500   card 300
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ManualMode, PaymentChannel, PosRecord};

/// Expected per-channel totals after manual sales are folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expectations {
    pub cash: Money,
    pub upi: Money,
    pub card: Money,
}

impl Expectations {
    /// Expected amount for one channel.
    pub fn channel(&self, channel: PaymentChannel) -> Money {
        match channel {
            PaymentChannel::Cash => self.cash,
            PaymentChannel::Upi => self.upi,
            PaymentChannel::Card => self.card,
        }
    }

    /// Sum across channels.
    pub fn total(&self) -> Money {
        self.cash + self.upi + self.card
    }
}

/// Adds `manual_amount` to the expectation of the channel named by `mode`.
///
/// With `ManualMode::None` the POS totals pass through untouched, so the
/// totals are conserved either way:
/// `total == pos.collections_total() + (manual_amount if mode != None)`.
pub fn adjust(pos: &PosRecord, manual_amount: Money, mode: ManualMode) -> Expectations {
    let mut expected = Expectations {
        cash: pos.received_cash,
        upi: pos.wallet_amount,
        card: pos.card_amount,
    };

    match mode.channel() {
        Some(PaymentChannel::Cash) => expected.cash += manual_amount,
        Some(PaymentChannel::Upi) => expected.upi += manual_amount,
        Some(PaymentChannel::Card) => expected.card += manual_amount,
        None => {}
    }

    expected
}

/// The part of a manual sale that actually lands in an expectation.
pub fn folded_manual_amount(manual_amount: Money, mode: ManualMode) -> Money {
    if mode.channel().is_some() {
        manual_amount
    } else {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
