//! Client-side catalog filtering by category and price

use crate::domain::Tool;

/// Category values that match every tool
pub const ALL_CATEGORIES: [&str; 2] = ["all", "Todas"];

/// Filters applied to an already-fetched tool list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolQuery {
    pub category: Option<String>,
    pub max_price: Option<f64>,
}

impl ToolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// True when no filter would remove anything
    pub fn is_empty(&self) -> bool {
        self.category_filter().is_none() && self.max_price.is_none()
    }

    pub fn matches(&self, tool: &Tool) -> bool {
        if let Some(category) = self.category_filter() {
            if tool.category.trim().to_lowercase() != category.to_lowercase() {
                return false;
            }
        }
        match self.max_price {
            Some(max) if max.is_finite() => tool.price <= max,
            _ => true,
        }
    }

    /// Keep matching tools, preserving order
    pub fn apply(&self, tools: impl IntoIterator<Item = Tool>) -> Vec<Tool> {
        tools.into_iter().filter(|t| self.matches(t)).collect()
    }

    fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !ALL_CATEGORIES.iter().any(|all| c.eq_ignore_ascii_case(all)))
    }
}
