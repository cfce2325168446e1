// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend rate table and cost calculation.
//!
//! Rates are USD per million tokens and come from `[cost.rates]`. A backend
//! missing from the table is priced at the most expensive configured rate so
//! estimates err high rather than low.

use std::collections::BTreeMap;

use tracing::debug;
use warden_config::model::{BackendRate, CostConfig};
use warden_core::TokenUsage;

const ZERO_RATE: BackendRate = BackendRate {
    input_per_mtok: 0.0,
    output_per_mtok: 0.0,
};

#[derive(Debug, Clone)]
pub struct RateTable {
    rates: BTreeMap<String, BackendRate>,
    /// Most expensive configured rate, used for unknown backends.
    fallback: BackendRate,
}

impl RateTable {
    pub fn new(rates: BTreeMap<String, BackendRate>) -> Self {
        let fallback = rates
            .values()
            .copied()
            .max_by(|a, b| {
                (a.input_per_mtok + a.output_per_mtok)
                    .total_cmp(&(b.input_per_mtok + b.output_per_mtok))
            })
            .unwrap_or(ZERO_RATE);
        Self { rates, fallback }
    }

    pub fn from_config(config: &CostConfig) -> Self {
        Self::new(config.rates.clone())
    }

    pub fn is_known(&self, backend: &str) -> bool {
        self.rates.contains_key(backend)
    }

    pub fn rate(&self, backend: &str) -> BackendRate {
        match self.rates.get(backend) {
            Some(rate) => *rate,
            None => {
                debug!(backend, "unknown backend priced at the highest configured rate");
                self.fallback
            }
        }
    }

    /// `input·input_rate + output·output_rate`, in USD.
    pub fn estimate(&self, backend: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        let rate = self.rate(backend);
        (f64::from(input_tokens) * rate.input_per_mtok
            + f64::from(output_tokens) * rate.output_per_mtok)
            / 1_000_000.0
    }

    pub fn cost(&self, backend: &str, usage: &TokenUsage) -> f64 {
        self.estimate(backend, usage.input_tokens, usage.output_tokens)
    }
}
