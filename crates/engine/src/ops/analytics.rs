use std::collections::HashMap;

use crate::{ResultEngine, TransactionKind};

use super::{Engine, TransactionListFilter, add_minor, total_minor};

/// Share of one category in a breakdown.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare {
    pub name: String,
    pub amount_minor: i64,
    /// Percent of the breakdown total, rounded to two decimals.
    pub percentage: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryShare>,
    pub total_minor: i64,
}

impl Engine {
    /// Group the listed transactions of one kind by category.
    ///
    /// Categories come out largest first, ties by name.
    pub async fn category_breakdown(
        &self,
        user_id: &str,
        kind: TransactionKind,
        year: Option<i32>,
        month: Option<u32>,
    ) -> ResultEngine<CategoryBreakdown> {
        let filter = TransactionListFilter {
            kind: Some(kind),
            year,
            month,
        };
        let listed = self.list_transactions(user_id, &filter).await?;

        let mut amounts: HashMap<String, i64> = HashMap::new();
        for tx in listed.transactions {
            let amount = amounts.entry(tx.category).or_default();
            *amount = add_minor(*amount, tx.amount_minor)?;
        }
        let total_minor = total_minor(amounts.values().copied())?;

        let mut categories: Vec<CategoryShare> = amounts
            .into_iter()
            .map(|(name, amount_minor)| CategoryShare {
                percentage: percentage_of(amount_minor, total_minor),
                color: self.categories.color_of(&name).to_string(),
                name,
                amount_minor,
            })
            .collect();
        categories.sort_by(|a, b| {
            b.amount_minor
                .cmp(&a.amount_minor)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(CategoryBreakdown {
            categories,
            total_minor,
        })
    }
}

fn percentage_of(amount_minor: i64, total_minor: i64) -> f64 {
    if total_minor == 0 {
        return 0.0;
    }
    let raw = amount_minor as f64 / total_minor as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
