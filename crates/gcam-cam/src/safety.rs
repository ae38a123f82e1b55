//! Composable feed-rate adjusters applied in a fixed order: slow down the
//! first pass, slow down at sharp corners, slow down on arcs.

/// Context passed to each adjuster for one feed-rate decision.
#[derive(Debug, Clone, Copy)]
pub struct FeedContext {
    pub pass_num: u32,
    pub is_arc: bool,
    /// Corner feed factor for this point, in `(0, 1]`; `1.0` means no corner.
    pub corner_factor: f64,
}

impl Default for FeedContext {
    fn default() -> Self {
        Self {
            pass_num: 0,
            is_arc: false,
            corner_factor: 1.0,
        }
    }
}

/// One feed-rate adjustment rule.
pub trait Adjuster {
    fn adjust_feed(&self, feed: f64, context: &FeedContext) -> f64;
    fn is_enabled(&self) -> bool;
}

/// Slows the first pass by a fixed factor — first-pass cuts are often
/// through a hard outer skin or finish veneer.
pub struct FirstPassAdjuster {
    pub first_pass_feed_factor: f64,
}

impl Adjuster for FirstPassAdjuster {
    fn adjust_feed(&self, feed: f64, context: &FeedContext) -> f64 {
        if context.pass_num == 0 {
            feed * self.first_pass_feed_factor
        } else {
            feed
        }
    }

    fn is_enabled(&self) -> bool {
        self.first_pass_feed_factor < 1.0
    }
}

/// Slows the feed when a point's corner factor indicates a sharp turn.
pub struct CornerSlowdownAdjuster {
    pub enabled: bool,
    pub corner_feed_factor: f64,
}

impl Adjuster for CornerSlowdownAdjuster {
    fn adjust_feed(&self, feed: f64, context: &FeedContext) -> f64 {
        if context.corner_factor < 1.0 {
            feed * self.corner_feed_factor * context.corner_factor
        } else {
            feed
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Slows the feed uniformly on arc moves, since arcs cut more aggressively
/// than straight moves at the same linear feed.
pub struct ArcSlowdownAdjuster {
    pub enabled: bool,
    pub arc_feed_factor: f64,
}

impl Adjuster for ArcSlowdownAdjuster {
    fn adjust_feed(&self, feed: f64, context: &FeedContext) -> f64 {
        if context.is_arc {
            feed * self.arc_feed_factor
        } else {
            feed
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// An ordered chain of adjusters, applied in registration order. Disabled
/// adjusters are skipped, not merely no-ops, so a caller can inspect which
/// ran.
#[derive(Default)]
pub struct SafetyChain {
    adjusters: Vec<Box<dyn Adjuster>>,
}

impl SafetyChain {
    pub fn new() -> Self {
        Self { adjusters: Vec::new() }
    }

    pub fn register(&mut self, adjuster: Box<dyn Adjuster>) {
        self.adjusters.push(adjuster);
    }

    pub fn adjusted_feed(&self, base_feed: f64, context: &FeedContext) -> f64 {
        let mut feed = base_feed;
        for adjuster in &self.adjusters {
            if adjuster.is_enabled() {
                feed = adjuster.adjust_feed(feed, context);
            }
        }
        feed
    }
}

/// Build the standard chain in the fixed order: first-pass, corner
/// slowdown, arc slowdown.
pub fn standard_chain(
    first_pass_feed_factor: f64,
    corner_slowdown_enabled: bool,
    corner_feed_factor: f64,
    arc_slowdown_enabled: bool,
    arc_feed_factor: f64,
) -> SafetyChain {
    let mut chain = SafetyChain::new();
    chain.register(Box::new(FirstPassAdjuster { first_pass_feed_factor }));
    chain.register(Box::new(CornerSlowdownAdjuster {
        enabled: corner_slowdown_enabled,
        corner_feed_factor,
    }));
    chain.register(Box::new(ArcSlowdownAdjuster {
        enabled: arc_slowdown_enabled,
        arc_feed_factor,
    }));
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_pass_adjuster_applies_on_pass_zero_only() {
        let adjuster = FirstPassAdjuster { first_pass_feed_factor: 0.7 };
        let ctx0 = FeedContext { pass_num: 0, ..Default::default() };
        let ctx1 = FeedContext { pass_num: 1, ..Default::default() };
        assert!((adjuster.adjust_feed(100.0, &ctx0) - 70.0).abs() < 1e-10);
        assert!((adjuster.adjust_feed(100.0, &ctx1) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_first_pass_adjuster_disabled_at_factor_one() {
        let adjuster = FirstPassAdjuster { first_pass_feed_factor: 1.0 };
        assert!(!adjuster.is_enabled());
    }

    #[test]
    fn test_corner_slowdown_applies_only_below_one() {
        let adjuster = CornerSlowdownAdjuster { enabled: true, corner_feed_factor: 0.5 };
        let ctx = FeedContext { corner_factor: 0.4, ..Default::default() };
        assert!((adjuster.adjust_feed(100.0, &ctx) - 20.0).abs() < 1e-10);

        let ctx_no_corner = FeedContext { corner_factor: 1.0, ..Default::default() };
        assert!((adjuster.adjust_feed(100.0, &ctx_no_corner) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_arc_slowdown_applies_only_on_arcs() {
        let adjuster = ArcSlowdownAdjuster { enabled: true, arc_feed_factor: 0.8 };
        let ctx = FeedContext { is_arc: true, ..Default::default() };
        assert!((adjuster.adjust_feed(100.0, &ctx) - 80.0).abs() < 1e-10);

        let ctx_straight = FeedContext { is_arc: false, ..Default::default() };
        assert!((adjuster.adjust_feed(100.0, &ctx_straight) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_standard_chain_applies_in_order() {
        let chain = standard_chain(0.7, true, 0.5, true, 0.8);
        let ctx = FeedContext {
            pass_num: 0,
            is_arc: true,
            corner_factor: 0.4,
        };
        // 100 * 0.7 (first pass) * 0.5*0.4 (corner) * 0.8 (arc) = 11.2
        let feed = chain.adjusted_feed(100.0, &ctx);
        assert!((feed - 11.2).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_adjuster_is_skipped() {
        let mut chain = SafetyChain::new();
        chain.register(Box::new(CornerSlowdownAdjuster { enabled: false, corner_feed_factor: 0.1 }));
        let ctx = FeedContext { corner_factor: 0.2, ..Default::default() };
        assert!((chain.adjusted_feed(100.0, &ctx) - 100.0).abs() < 1e-10);
    }
}
