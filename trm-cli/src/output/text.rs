//! Text output formatting with progress bars and colors.

use rust_decimal::Decimal;
use trm_core::format::{format_compact_number, format_money, format_percent};
use trm_core::{CreditUsage, PriceBreakdown, RuleTable, SummaryStats};
use trm_engine::{is_approaching_limit, percent_used};
use trm_store::Settings;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

const LABEL_WIDTH: usize = 22;

/// How summary figures are labelled.
#[derive(Debug, Clone)]
pub struct SummaryView<'a> {
    /// Currency for the amount sum.
    pub currency: &'a str,
    /// Status counted as success.
    pub success_status: &'a str,
    /// Show counts as `1.5K`.
    pub compact: bool,
}

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    // ========================================================================
    // Quotes
    // ========================================================================

    /// Formats an itemized quote.
    pub fn format_quote(&self, quote: &PriceBreakdown) -> String {
        let money = |amount: Decimal| format_money(amount, &quote.currency);
        let mut lines = vec![self.bold("Job Posting Quote"), "─".repeat(40)];

        lines.push(row("Base price:", &money(quote.base_price)));
        if !quote.featured_surcharge.is_zero() {
            lines.push(row("Featured:", &format!("+{}", money(quote.featured_surcharge))));
        }
        if !quote.urgent_surcharge.is_zero() {
            lines.push(row("Urgent:", &format!("+{}", money(quote.urgent_surcharge))));
        }
        if quote.quantity > 1 {
            lines.push(row("Per posting:", &money(quote.unit_total())));
            lines.push(row("Quantity:", &format!("× {}", quote.quantity)));
            lines.push(row("Subtotal:", &money(quote.subtotal)));
        }
        if !quote.volume_discount.is_zero() {
            let label = format!("Volume discount {}%:", quote.volume_discount_percent.normalize());
            lines.push(row(&label, &self.green(&format!("-{}", money(quote.volume_discount)))));
        }
        if let Some(code) = &quote.promo_code {
            let label = format!("Promo {code}:");
            lines.push(row(&label, &self.green(&format!("-{}", money(quote.promo_discount)))));
        }

        lines.push("─".repeat(40));
        // pad before styling so escape codes don't count toward the width
        lines.push(self.bold(&row("Total:", &money(quote.total))));
        lines.join("\n")
    }

    // ========================================================================
    // Summaries
    // ========================================================================

    /// Formats summary statistics.
    pub fn format_summary(&self, stats: &SummaryStats, view: &SummaryView<'_>) -> String {
        let mut lines = vec![self.bold("Summary"), "─".repeat(40)];

        if stats.is_empty() {
            lines.push(self.dim("No records"));
            return lines.join("\n");
        }

        lines.push(row("Records:", &self.count(stats.total, view.compact)));
        lines.push(row("Total amount:", &format_money(stats.sum, view.currency)));
        if let Some(avg) = stats.average() {
            lines.push(row("Average:", &format_money(avg, view.currency)));
        }
        lines.push(row(
            &format!("Rate ({}):", view.success_status),
            &self.cyan(&format_percent(stats.rate)),
        ));
        if stats.trend != 0.0 {
            lines.push(row("Trend:", &self.trend(stats.trend)));
        }

        lines.push(String::new());
        lines.push(self.dim("By status:"));
        for (status, count) in &stats.by_status {
            lines.push(format!("  {status:<20}{}", self.count(*count, view.compact)));
        }

        if let Some(groups) = &stats.groups {
            lines.push(String::new());
            lines.push(self.dim("Groups:"));
            for (key, group) in groups {
                lines.push(format!(
                    "  {key:<20}{:<8}{}",
                    self.count(group.count, view.compact),
                    format_money(group.sum, view.currency)
                ));
            }
        }

        lines.join("\n")
    }

    fn trend(&self, trend: f64) -> String {
        let text = if trend > 0.0 {
            format!("▲ +{}", format_percent(trend))
        } else {
            format!("▼ {}", format_percent(trend))
        };
        if trend > 0.0 {
            self.green(&text)
        } else {
            self.red(&text)
        }
    }

    fn count(&self, n: u64, compact: bool) -> String {
        if compact {
            format_compact_number(n as f64)
        } else {
            n.to_string()
        }
    }

    // ========================================================================
    // Credits
    // ========================================================================

    /// Formats credit usage with a bar of what is left.
    pub fn format_credits(&self, credits: &CreditUsage) -> String {
        let mut lines = vec![self.bold("Credits")];

        let Some(capacity) = credits.capacity() else {
            lines.push(row("Used:", &credits.usage.to_string()));
            lines.push(row("Remaining:", &self.green("Unlimited")));
            return lines.join("\n");
        };

        let used = percent_used(credits);
        let left = f64::from(100 - used);
        let bar = self.progress_bar(left);
        let pct = self.color_for_percent(left, &format!("{}% left", 100 - used));

        lines.push(row("Used:", &format!("{} of {capacity}", credits.usage)));
        if credits.bonus_credits > 0 {
            lines.push(row("Bonus:", &credits.bonus_credits.to_string()));
        }
        lines.push(row("Remaining:", &credits.remaining.to_string()));
        lines.push(format!("{bar} {pct}"));

        if credits.is_exhausted() {
            lines.push(self.red("No credits left"));
        } else if is_approaching_limit(credits) {
            lines.push(self.yellow("Approaching limit"));
        }

        lines.join("\n")
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let fraction = (percent_remaining / 100.0).clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let filled = (fraction * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Formats the active rule table.
    pub fn format_rules(&self, rules: &RuleTable, source: &str) -> String {
        let money = |amount: Decimal| format_money(amount, &rules.currency);
        let mut lines = vec![
            format!("{} ({})", self.bold("Rule Table"), self.dim(source)),
            "─".repeat(40),
            row("Currency:", &rules.currency),
        ];

        lines.push(String::new());
        lines.push(self.dim("Category rates:"));
        for (category, rate) in &rules.category_rates {
            lines.push(format!("  {category:<20}{}", money(*rate)));
        }
        lines.push(format!("  {:<20}{}", "(default)", money(rules.default_rate)));

        lines.push(String::new());
        lines.push(row("Featured multiplier:", &format!("×{}", rules.featured_multiplier.normalize())));
        lines.push(row("Urgent multiplier:", &format!("×{}", rules.urgent_multiplier.normalize())));

        if !rules.volume_tiers.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("Volume tiers:"));
            let mut tiers: Vec<_> = rules.volume_tiers.iter().collect();
            tiers.sort_by_key(|t| t.min_quantity);
            for tier in tiers {
                lines.push(format!(
                    "  {:<20}{}% off",
                    format!("{}+ postings", tier.min_quantity),
                    tier.discount_percent.normalize()
                ));
            }
        }

        if !rules.promo_codes.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("Promo codes:"));
            for (code, promo) in &rules.promo_codes {
                let mut parts = Vec::new();
                if let Some(p) = promo.percent_off {
                    parts.push(format!("{}% off", p.normalize()));
                }
                if let Some(f) = promo.flat_off {
                    parts.push(format!("{} off", money(f)));
                }
                if let Some(exp) = promo.expires_at {
                    parts.push(format!("until {}", trm_core::format_date(exp)));
                }
                lines.push(format!("  {code:<20}{}", parts.join(", ")));
            }
        }

        lines.join("\n")
    }

    /// Formats user settings.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let rules_path = settings
            .rules_path
            .as_ref()
            .map_or_else(|| self.dim("(config dir)"), |p| p.display().to_string());

        [
            self.bold("TRM Configuration"),
            "─".repeat(40),
            row("Currency:", &settings.currency),
            row("Success status:", &settings.success_status),
            row("Rules path:", &rules_path),
            row("Log level:", &settings.log_level.to_string()),
            row("Compact numbers:", &settings.compact_numbers.to_string()),
        ]
        .join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn row(label: &str, value: &str) -> String {
    format!("{label:<LABEL_WIDTH$}{value}")
}
