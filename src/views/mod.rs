// SPDX-License-Identifier: MPL-2.0

mod analytics;
mod dashboard;

pub use analytics::{AnalyticsSnapshot, format_trend};
pub use dashboard::{Activity, DashboardSummary};
