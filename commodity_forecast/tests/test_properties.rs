use chrono::{Datelike, Duration, NaiveDate};
use commodity_forecast::data::IndicatorSeries;
use commodity_forecast::metrics::rmse;
use commodity_forecast::{align, monthly_resample, train_test_split};
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn indicator(name: &'static str) -> impl Strategy<Value = IndicatorSeries> {
    prop::collection::vec((0i64..500, prop::option::of(-1000.0f64..1000.0)), 0..40).prop_map(
        move |points| {
            IndicatorSeries::new(
                name,
                points
                    .into_iter()
                    .map(|(offset, value)| (base_date() + Duration::days(offset), value))
                    .collect(),
            )
        },
    )
}

fn indicators() -> impl Strategy<Value = Vec<IndicatorSeries>> {
    (indicator("gold"), indicator("silver"), indicator("cpi")).prop_map(|(a, b, c)| vec![a, b, c])
}

proptest! {
    #[test]
    fn aligned_table_has_no_missing_cells(series in indicators()) {
        let table = align(&series).unwrap();

        prop_assert!(table.dates().windows(2).all(|w| w[0] < w[1]));
        for name in table.columns() {
            let column = table.column(name).unwrap();
            prop_assert_eq!(column.len(), table.len());
            prop_assert!(column.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn align_is_idempotent(series in indicators()) {
        let once = align(&series).unwrap();
        let twice = align(&once.to_series()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn monthly_rows_bounded_by_months_spanned(series in indicators()) {
        let table = align(&series).unwrap();
        let monthly = monthly_resample(&table).unwrap();

        let spanned = match (table.dates().first(), table.dates().last()) {
            (Some(first), Some(last)) => {
                ((last.year() - first.year()) * 12 + last.month() as i32 - first.month() as i32 + 1) as usize
            }
            _ => 0,
        };
        prop_assert!(monthly.len() <= spanned);
        prop_assert!(monthly.dates().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn split_reconstructs_series(
        series in prop::collection::vec(-1e6f64..1e6, 2..200),
        fraction in 0.01f64..0.99,
    ) {
        let expected_train = (series.len() as f64 * fraction).floor() as usize;
        match train_test_split(&series, fraction) {
            Ok(split) => {
                prop_assert_eq!(split.train().len(), expected_train);
                prop_assert_eq!([split.train(), split.test()].concat(), series);
            }
            Err(err) => {
                prop_assert!(err.is_insufficient_data());
                prop_assert!(expected_train == 0 || expected_train == series.len());
            }
        }
    }

    #[test]
    fn rmse_zero_on_identity_and_symmetric(
        pairs in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 1..100),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        prop_assert_eq!(rmse(&a, &a).unwrap(), 0.0);
        let forward = rmse(&a, &b).unwrap();
        prop_assert!(forward >= 0.0);
        prop_assert_eq!(forward, rmse(&b, &a).unwrap());
    }
}
