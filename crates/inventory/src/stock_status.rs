//! Stock status derivation after a quantity change.

use crate::configuration::StockItemConfiguration;
use crate::source_item::{SourceItem, SourceItemStatus};

/// Derive the stock status of a source item from its quantity and
/// configuration. Pure; no side effects.
///
/// A source item is out of stock when its quantity equals the configured
/// minimum and backorders are disabled. The comparison is equality, not
/// `<=`: a quantity strictly below `min_qty` without backorders still
/// reports in stock.
pub fn source_stock_status(
    config: &StockItemConfiguration,
    item: &SourceItem,
) -> SourceItemStatus {
    // Zero-equivalent quantities (including -0.0) compare as exactly 0.0.
    let quantity = if item.quantity() == 0.0 {
        0.0
    } else {
        item.quantity()
    };

    if quantity == config.min_qty() && !config.backorders() {
        SourceItemStatus::OutOfStock
    } else {
        SourceItemStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64) -> SourceItem {
        SourceItem::new("warehouse_a", "SKU-1", quantity, SourceItemStatus::InStock).unwrap()
    }

    fn config(min_qty: f64, backorders: bool) -> StockItemConfiguration {
        StockItemConfiguration::new(true, min_qty, backorders)
    }

    #[test]
    fn quantity_at_min_without_backorders_is_out_of_stock() {
        assert_eq!(
            source_stock_status(&config(0.0, false), &item(0.0)),
            SourceItemStatus::OutOfStock
        );
        assert_eq!(
            source_stock_status(&config(2.5, false), &item(2.5)),
            SourceItemStatus::OutOfStock
        );
    }

    #[test]
    fn quantity_below_min_without_backorders_is_still_in_stock() {
        assert_eq!(
            source_stock_status(&config(0.0, false), &item(-3.0)),
            SourceItemStatus::InStock
        );
        assert_eq!(
            source_stock_status(&config(5.0, false), &item(2.0)),
            SourceItemStatus::InStock
        );
    }

    #[test]
    fn backorders_keep_the_item_in_stock_at_min_qty() {
        assert_eq!(
            source_stock_status(&config(0.0, true), &item(0.0)),
            SourceItemStatus::InStock
        );
    }

    #[test]
    fn quantity_above_min_is_in_stock() {
        assert_eq!(
            source_stock_status(&config(0.0, false), &item(10.0)),
            SourceItemStatus::InStock
        );
    }

    #[test]
    fn negative_zero_quantity_matches_zero_min_qty() {
        assert_eq!(
            source_stock_status(&config(0.0, false), &item(-0.0)),
            SourceItemStatus::OutOfStock
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Out of stock exactly when quantity equals min_qty with
            /// backorders disabled; every other combination is in stock.
            #[test]
            fn status_is_equality_based(
                quantity in -1000.0f64..1000.0,
                min_qty in -1000.0f64..1000.0,
                backorders in any::<bool>(),
            ) {
                let status = source_stock_status(
                    &config(min_qty, backorders),
                    &item(quantity),
                );

                let expected = if quantity == min_qty && !backorders {
                    SourceItemStatus::OutOfStock
                } else {
                    SourceItemStatus::InStock
                };

                prop_assert_eq!(status, expected);
            }

            /// Strictly-below-minimum quantities never flip the status on
            /// their own.
            #[test]
            fn below_min_is_in_stock(
                min_qty in -1000.0f64..1000.0,
                delta in 0.001f64..1000.0,
            ) {
                let status = source_stock_status(
                    &config(min_qty, false),
                    &item(min_qty - delta),
                );

                prop_assert_eq!(status, SourceItemStatus::InStock);
            }
        }
    }
}
