// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring defects.
//!
//! These signal programming mistakes in how routers and presentables are
//! wired together, not expected runtime states. They are never returned as
//! values: they are logged (or, with the `strict_wiring` feature, turned into
//! panics), and the operation that hit them completes anyway.

use thiserror::Error;

/// A navigation wiring mistake.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WiringDefect {
    /// No presentable on the deep-link context stack can route the next hop.
    #[error("no router found for deep-link hop `{route_type}` after {resolved} resolved hop(s)")]
    NoRouterFound {
        /// Type name of the unresolved route.
        route_type: &'static str,
        /// Number of hops that resolved before this one.
        resolved: usize,
    },
    /// A presentable that must be shown or resolved has no display unit.
    #[error("presentable introduced by `{context}` has no display unit")]
    MissingDisplayUnit {
        /// What introduced the presentable (a transition component or a route type).
        context: &'static str,
    },
}

/// Report a wiring defect.
pub(crate) fn report(defect: &WiringDefect) {
    tracing::error!(%defect, "navigation wiring defect");
    if cfg!(feature = "strict_wiring") {
        panic!("navigation wiring defect: {defect}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(feature = "strict_wiring"))]
    use tracing_test::traced_test;

    #[test]
    fn defect_messages_name_the_route() {
        let d = WiringDefect::NoRouterFound {
            route_type: "app::SettingsRoute",
            resolved: 2,
        };
        assert_eq!(
            d.to_string(),
            "no router found for deep-link hop `app::SettingsRoute` after 2 resolved hop(s)"
        );
        let d = WiringDefect::MissingDisplayUnit { context: "present" };
        assert_eq!(
            d.to_string(),
            "presentable introduced by `present` has no display unit"
        );
    }

    #[test]
    #[cfg(not(feature = "strict_wiring"))]
    #[traced_test]
    fn report_logs_and_returns() {
        report(&WiringDefect::MissingDisplayUnit { context: "push" });
        assert!(logs_contain("navigation wiring defect"));
        assert!(logs_contain("presentable introduced by `push` has no display unit"));
    }

    #[test]
    #[cfg(feature = "strict_wiring")]
    #[should_panic(expected = "navigation wiring defect: no router found for deep-link hop")]
    fn strict_wiring_panics() {
        report(&WiringDefect::NoRouterFound {
            route_type: "app::Missing",
            resolved: 1,
        });
    }
}
