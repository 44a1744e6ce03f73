/// Server-side procedures on a promo code.
#[derive(Debug, Clone)]
pub enum PromoCodeAction {
    /// Atomically bumps `used_count`, refusing once `max_uses` is reached.
    IncrementUsage,
}

/// Results from PromoCodeActions - variants match 1:1 with PromoCodeAction
#[derive(Debug, Clone, PartialEq)]
pub enum PromoCodeActionResult {
    IncrementUsage { used_count: u32 },
}
