//! FILENAME: core/drill-engine/src/engine.rs
//! Drill engine - the calculation core that turns records into series.
//!
//! `compute` is a pure function of `(hierarchy, cache, state)`:
//! 1. Filter records by equality against every selection in the path
//! 2. Non-terminal level: group by the level's field and aggregate the
//!    metric per group, in first-seen key order
//! 3. Terminal level: bucket by calendar month, average the value field per
//!    month, sort chronologically, flag the highest/lowest averages
//!
//! Nothing is cached between calls; views are derived fresh on every
//! navigation step and never persisted.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use crate::cache::{DatasetCache, ValueId};
use crate::definition::{Aggregation, FieldIndex, Hierarchy};
use crate::state::DrillState;
use crate::view::{CategorySlice, DrillView, TrendPoint};

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Running aggregate over the numeric metric of one group.
/// Missing and non-numeric values are never added, so they contribute
/// nothing to any aggregate (a group of only missing values sums to 0).
#[derive(Debug, Clone, Default)]
pub(crate) struct Accumulator {
    sum: f64,
    count: u64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    pub(crate) fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn compute(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.sum,
            Aggregation::Count => self.count as f64,
            Aggregation::Average => {
                if self.count > 0 {
                    self.sum / (self.count as f64)
                } else {
                    0.0
                }
            }
            Aggregation::Min => self.min.unwrap_or(0.0),
            Aggregation::Max => self.max.unwrap_or(0.0),
        }
    }
}

// ============================================================================
// PATH FILTERING
// ============================================================================

/// Translates the selection path into `(field, value)` equality constraints.
pub(crate) fn path_constraints(
    hierarchy: &Hierarchy,
    state: &DrillState,
) -> Vec<(FieldIndex, ValueId)> {
    state
        .path
        .iter()
        .map(|entry| (hierarchy.levels[entry.level].field, entry.value))
        .collect()
}

/// Groups the filtered records by `group_field`, accumulating the metric.
/// Group order is first-seen order over the filtered records.
pub(crate) fn category_groups(
    cache: &DatasetCache,
    constraints: &[(FieldIndex, ValueId)],
    group_field: FieldIndex,
    metric_field: FieldIndex,
) -> Vec<(ValueId, Accumulator)> {
    let mut group_of: FxHashMap<ValueId, usize> = FxHashMap::default();
    let mut groups: Vec<(ValueId, Accumulator)> = Vec::new();

    for record in cache.matching_records(constraints) {
        let key = record.value_at(group_field);
        let idx = *group_of.entry(key).or_insert_with(|| {
            groups.push((key, Accumulator::default()));
            groups.len() - 1
        });
        if let Some(metric) = cache.value_of(record, metric_field).as_number() {
            groups[idx].1.add(metric);
        }
    }

    groups
}

pub(crate) fn group_label(cache: &DatasetCache, field: FieldIndex, id: ValueId) -> String {
    cache
        .fields
        .get(field)
        .and_then(|f| f.get_value(id))
        .map(|v| v.display())
        .unwrap_or_default()
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Computes the view for the current level: a category breakdown at
/// non-terminal levels, the monthly trend series at the terminal level.
/// An empty filtered set yields an empty view, never an error.
pub fn compute(hierarchy: &Hierarchy, cache: &DatasetCache, state: &DrillState) -> DrillView {
    let constraints = path_constraints(hierarchy, state);

    if hierarchy.is_trend_level(state.level) {
        DrillView::Trend(compute_trend(hierarchy, cache, &constraints))
    } else {
        let group_field = hierarchy.levels[state.level].field;
        DrillView::Categories(compute_categories(hierarchy, cache, &constraints, group_field))
    }
}

/// Breakdown of an arbitrary field under the current path, sorted descending
/// by aggregated metric and truncated to `limit`. Used for the "top N by
/// quantity" side charts.
pub fn compute_top(
    hierarchy: &Hierarchy,
    cache: &DatasetCache,
    state: &DrillState,
    field: FieldIndex,
    limit: usize,
) -> Vec<CategorySlice> {
    let constraints = path_constraints(hierarchy, state);
    let mut slices = compute_categories(hierarchy, cache, &constraints, field);
    slices.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    slices.truncate(limit);
    slices
}

fn compute_categories(
    hierarchy: &Hierarchy,
    cache: &DatasetCache,
    constraints: &[(FieldIndex, ValueId)],
    group_field: FieldIndex,
) -> Vec<CategorySlice> {
    category_groups(cache, constraints, group_field, hierarchy.metric_field)
        .into_iter()
        .map(|(key, acc)| CategorySlice {
            label: group_label(cache, group_field, key),
            value: acc.compute(hierarchy.metric_aggregation),
        })
        .collect()
}

fn compute_trend(
    hierarchy: &Hierarchy,
    cache: &DatasetCache,
    constraints: &[(FieldIndex, ValueId)],
) -> Vec<TrendPoint> {
    let mut bucket_of: FxHashMap<NaiveDate, usize> = FxHashMap::default();
    let mut buckets: Vec<(NaiveDate, Accumulator)> = Vec::new();

    for record in cache.matching_records(constraints) {
        let date = match cache.value_of(record, hierarchy.trend.date_field).as_date() {
            Some(d) => d,
            None => continue,
        };
        // Calendar month bucket, keyed by its first day.
        let month = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);

        let idx = *bucket_of.entry(month).or_insert_with(|| {
            buckets.push((month, Accumulator::default()));
            buckets.len() - 1
        });
        if let Some(value) = cache.value_of(record, hierarchy.trend.value_field).as_number() {
            buckets[idx].1.add(value);
        }
    }

    // Months where no record carried a numeric value have no average.
    let mut points: Vec<TrendPoint> = buckets
        .into_iter()
        .filter(|(_, acc)| !acc.is_empty())
        .map(|(month, acc)| TrendPoint::new(month, acc.compute(Aggregation::Average)))
        .collect();

    // True date ordering, not a lexical sort of the labels.
    points.sort_by_key(|p| p.period);
    flag_extremes(&mut points);
    points
}

/// Flags every point whose average equals the global minimum or maximum.
/// Ties are all flagged; a single point is both highest and lowest.
fn flag_extremes(points: &mut [TrendPoint]) {
    if points.is_empty() {
        return;
    }

    let mut lowest = points[0].average;
    let mut highest = points[0].average;
    for point in points.iter() {
        lowest = lowest.min(point.average);
        highest = highest.max(point.average);
    }

    for point in points.iter_mut() {
        point.is_highest = point.average == highest;
        point.is_lowest = point.average == lowest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheValue;
    use crate::definition::{DrillLevel, TrendLevel};
    use crate::state::{apply, DrillAction};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Three records over one brand level: brand / qty / month / price.
    fn small_cache() -> DatasetCache {
        let mut cache = DatasetCache::new(&["Brand", "Quantity", "Month", "UnitPrice"]);
        cache.add_record(&[
            CacheValue::text("A"),
            CacheValue::number(10.0),
            CacheValue::Date(date(2023, 1, 1)),
            CacheValue::number(5.0),
        ]);
        cache.add_record(&[
            CacheValue::text("A"),
            CacheValue::number(20.0),
            CacheValue::Date(date(2023, 2, 1)),
            CacheValue::number(7.0),
        ]);
        cache.add_record(&[
            CacheValue::text("B"),
            CacheValue::number(5.0),
            CacheValue::Date(date(2023, 1, 1)),
            CacheValue::number(9.0),
        ]);
        cache
    }

    fn brand_hierarchy() -> Hierarchy {
        Hierarchy::new(
            "trades",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 2, 3),
            1,
        )
    }

    #[test]
    fn test_root_breakdown_sums_by_brand() {
        let cache = small_cache();
        let hierarchy = brand_hierarchy();
        let state = DrillState::root();

        let view = compute(&hierarchy, &cache, &state);
        assert_eq!(
            view.categories(),
            &[
                CategorySlice { label: "A".to_string(), value: 30.0 },
                CategorySlice { label: "B".to_string(), value: 5.0 },
            ]
        );
    }

    #[test]
    fn test_trend_after_select() {
        let cache = small_cache();
        let hierarchy = brand_hierarchy();
        let state = apply(
            &hierarchy,
            &cache,
            &DrillState::root(),
            DrillAction::Select("A".to_string()),
        )
        .unwrap();

        let view = compute(&hierarchy, &cache, &state);
        let points = view.trend();
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].label, "2023-01");
        assert_eq!(points[0].average, 5.0);
        assert!(points[0].is_lowest);
        assert!(!points[0].is_highest);

        assert_eq!(points[1].label, "2023-02");
        assert_eq!(points[1].average, 7.0);
        assert!(points[1].is_highest);
        assert!(!points[1].is_lowest);
    }

    #[test]
    fn test_filter_only_matching_records() {
        let cache = small_cache();
        let b = cache.fields[0].lookup(&CacheValue::text("B")).unwrap();

        let groups = category_groups(&cache, &[(0, b)], 0, 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1.compute(Aggregation::Sum), 5.0);
    }

    #[test]
    fn test_conservation_of_metric_sum() {
        let cache = small_cache();
        let hierarchy = brand_hierarchy();
        let view = compute(&hierarchy, &cache, &DrillState::root());

        let category_total: f64 = view.categories().iter().map(|s| s.value).sum();
        let record_total: f64 = cache
            .records
            .iter()
            .filter_map(|r| cache.value_of(r, 1).as_number())
            .sum();
        assert_eq!(category_total, record_total);
    }

    #[test]
    fn test_first_seen_order_is_not_alphabetical() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity"]);
        for (brand, qty) in [("Zara", 1.0), ("Acme", 2.0), ("Mango", 3.0), ("Acme", 4.0)] {
            cache.add_record(&[CacheValue::text(brand), CacheValue::number(qty)]);
        }
        let hierarchy = Hierarchy::new(
            "order",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 0, 1),
            1,
        );

        let view = compute(&hierarchy, &cache, &DrillState::root());
        let labels: Vec<&str> = view.categories().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Zara", "Acme", "Mango"]);
    }

    #[test]
    fn test_trend_sorted_chronologically_not_lexically() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity", "Date", "Price"]);
        // Inserted out of order, spanning a year boundary where a string
        // sort of "Oct"/"Jan" style labels would get it wrong.
        for (ymd, price) in [
            ((2023, 1, 15), 4.0),
            ((2022, 10, 3), 2.0),
            ((2022, 12, 20), 3.0),
        ] {
            cache.add_record(&[
                CacheValue::text("A"),
                CacheValue::number(1.0),
                CacheValue::Date(date(ymd.0, ymd.1, ymd.2)),
                CacheValue::number(price),
            ]);
        }
        let hierarchy = Hierarchy::new(
            "order",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 2, 3),
            1,
        );
        let state = apply(
            &hierarchy,
            &cache,
            &DrillState::root(),
            DrillAction::Select("A".to_string()),
        )
        .unwrap();

        let view = compute(&hierarchy, &cache, &state);
        let labels: Vec<&str> = view.trend().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2022-10", "2022-12", "2023-01"]);
    }

    #[test]
    fn test_single_period_flagged_both_ways() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity", "Date", "Price"]);
        cache.add_record(&[
            CacheValue::text("A"),
            CacheValue::number(1.0),
            CacheValue::Date(date(2023, 3, 10)),
            CacheValue::number(6.0),
        ]);
        let hierarchy = Hierarchy::new(
            "single",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 2, 3),
            1,
        );
        let state = apply(
            &hierarchy,
            &cache,
            &DrillState::root(),
            DrillAction::Select("A".to_string()),
        )
        .unwrap();

        let points = compute(&hierarchy, &cache, &state);
        let points = points.trend();
        assert_eq!(points.len(), 1);
        assert!(points[0].is_highest);
        assert!(points[0].is_lowest);
    }

    #[test]
    fn test_tied_extremes_all_flagged() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity", "Date", "Price"]);
        for (month, price) in [(1, 5.0), (2, 9.0), (3, 5.0), (4, 9.0)] {
            cache.add_record(&[
                CacheValue::text("A"),
                CacheValue::number(1.0),
                CacheValue::Date(date(2023, month, 1)),
                CacheValue::number(price),
            ]);
        }
        let hierarchy = Hierarchy::new(
            "ties",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 2, 3),
            1,
        );
        let state = apply(
            &hierarchy,
            &cache,
            &DrillState::root(),
            DrillAction::Select("A".to_string()),
        )
        .unwrap();

        let view = compute(&hierarchy, &cache, &state);
        let lows: Vec<bool> = view.trend().iter().map(|p| p.is_lowest).collect();
        let highs: Vec<bool> = view.trend().iter().map(|p| p.is_highest).collect();
        assert_eq!(lows, [true, false, true, false]);
        assert_eq!(highs, [false, true, false, true]);
    }

    #[test]
    fn test_empty_filtered_set_yields_empty_view() {
        let cache = DatasetCache::new(&["Brand", "Quantity", "Date", "Price"]);
        let hierarchy = brand_hierarchy();

        let view = compute(&hierarchy, &cache, &DrillState::root());
        assert!(view.is_empty());
        assert!(view.trend().is_empty());
    }

    #[test]
    fn test_missing_metric_contributes_nothing() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity"]);
        cache.add_record(&[CacheValue::text("A"), CacheValue::number(10.0)]);
        cache.add_record(&[CacheValue::text("A"), CacheValue::Empty]);
        cache.add_record(&[CacheValue::text("A"), CacheValue::text("n/a")]);
        let hierarchy = Hierarchy::new(
            "missing",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 0, 1),
            1,
        );

        let view = compute(&hierarchy, &cache, &DrillState::root());
        assert_eq!(view.categories(), &[CategorySlice { label: "A".to_string(), value: 10.0 }]);
    }

    #[test]
    fn test_month_without_numeric_prices_is_omitted() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity", "Date", "Price"]);
        cache.add_record(&[
            CacheValue::text("A"),
            CacheValue::number(1.0),
            CacheValue::Date(date(2023, 1, 5)),
            CacheValue::number(4.0),
        ]);
        cache.add_record(&[
            CacheValue::text("A"),
            CacheValue::number(1.0),
            CacheValue::Date(date(2023, 2, 5)),
            CacheValue::Empty,
        ]);
        let hierarchy = Hierarchy::new(
            "gaps",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 2, 3),
            1,
        );
        let state = apply(
            &hierarchy,
            &cache,
            &DrillState::root(),
            DrillAction::Select("A".to_string()),
        )
        .unwrap();

        let view = compute(&hierarchy, &cache, &state);
        let labels: Vec<&str> = view.trend().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2023-01"]);
    }

    #[test]
    fn test_compute_top_sorts_descending_and_truncates() {
        let mut cache = DatasetCache::new(&["Brand", "Dimension", "Quantity"]);
        for (dim, qty) in [("150cm", 10.0), ("90cm", 50.0), ("120cm", 30.0), ("90cm", 5.0)] {
            cache.add_record(&[
                CacheValue::text("A"),
                CacheValue::text(dim),
                CacheValue::number(qty),
            ]);
        }
        let hierarchy = Hierarchy::new(
            "top",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 1, 2),
            2,
        );

        let top = compute_top(&hierarchy, &cache, &DrillState::root(), 1, 2);
        assert_eq!(
            top,
            vec![
                CategorySlice { label: "90cm".to_string(), value: 55.0 },
                CategorySlice { label: "120cm".to_string(), value: 30.0 },
            ]
        );
    }

    #[test]
    fn test_average_aggregation_at_category_level() {
        let mut cache = DatasetCache::new(&["Brand", "Quantity"]);
        cache.add_record(&[CacheValue::text("A"), CacheValue::number(10.0)]);
        cache.add_record(&[CacheValue::text("A"), CacheValue::number(20.0)]);
        let mut hierarchy = Hierarchy::new(
            "avg",
            vec![DrillLevel::new("brand", 0)],
            TrendLevel::new("monthly_trends", 0, 1),
            1,
        );
        hierarchy.metric_aggregation = Aggregation::Average;

        let view = compute(&hierarchy, &cache, &DrillState::root());
        assert_eq!(view.categories()[0].value, 15.0);
    }
}
