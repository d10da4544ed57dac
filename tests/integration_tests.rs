use anyhow::Result;
use chrono::NaiveDate;
use series_comparison_engine::*;

/// Byte-level CSV tokenization is a collaborator, not part of the engine;
/// tests stand it in with the `csv` crate.
fn grid_from_csv(bytes: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month_of_points(label: &str, y: i32, m: u32, base: f64) -> Dataset {
    Dataset {
        label: label.to_string(),
        data: (1..=28)
            .map(|d| DataPoint::new(date(y, m, d), base + d as f64))
            .collect(),
        color: "#000".to_string(),
        metric_name: "Revenue".to_string(),
        unit: None,
    }
}

#[test]
fn test_csv_upload_to_canonical_series() -> Result<()> {
    let grid = grid_from_csv("Date,Revenue\n2024-01-01,100\n2024-01-02,200\n")?;
    let parsed = parse_grid(&grid, None)?;

    assert_eq!(parsed.metric_name, "Revenue");
    assert_eq!(
        parsed.series,
        vec![
            DataPoint::new(date(2024, 1, 1), 100.0),
            DataPoint::new(date(2024, 1, 2), 200.0),
        ]
    );
    Ok(())
}

#[test]
fn test_messy_export_with_comments_and_totals() -> Result<()> {
    let csv = "\
# Analytics export\n\
Site,example.com\n\
Date,Sessions,Revenue\n\
20240101,15,\"1,500.00\"\n\
20240102,20,\"2,000.00\"\n\
Grand Total,35,\"3,500.00\"\n";

    let grid = grid_from_csv(csv)?;
    let parsed = parse_grid(&grid, None)?;

    // Comment and preamble rows are skipped, the summary row is dropped,
    // and both numeric columns are detected. "Sessions" is the first
    // keyword-bearing column, so it wins the default selection.
    assert_eq!(parsed.metric_name, "Sessions");
    assert_eq!(parsed.series.len(), 2);
    assert_eq!(parsed.series[0].value, 15.0);
    assert_eq!(
        parsed.detected_metrics,
        vec!["Sessions".to_string(), "Revenue".to_string()]
    );

    // The analyst can still flip to the revenue column explicitly
    let revenue = parse_grid(&grid, Some("Revenue"))?;
    assert_eq!(revenue.metric_name, "Revenue");
    assert_eq!(revenue.series[0].value, 1500.0);
    Ok(())
}

#[test]
fn test_weekly_aggregation_of_parsed_series() -> Result<()> {
    let grid = grid_from_csv("Date,Revenue\n2024-01-01,10\n2024-01-03,20\n")?;
    let parsed = parse_grid(&grid, None)?;

    let weekly = aggregate(&parsed.series, Granularity::Weekly);
    assert_eq!(weekly.len(), 1);
    assert_eq!(weekly[0].date, date(2024, 1, 1));
    assert_eq!(weekly[0].value, 30.0);
    assert_eq!(weekly[0].average, Some(15.0));
    assert_eq!(weekly[0].count, Some(2));
    Ok(())
}

#[test]
fn test_aggregation_preserves_totals_end_to_end() -> Result<()> {
    let mut csv = String::from("Date,Revenue\n");
    for day in 1..=31 {
        csv.push_str(&format!("2024-01-{:02},{}\n", day, day * 3));
    }
    let parsed = parse_grid(&grid_from_csv(&csv)?, None)?;
    let raw_total: f64 = parsed.series.iter().map(|p| p.value).sum();

    for granularity in [Granularity::Weekly, Granularity::Monthly] {
        let bucketed: f64 = aggregate(&parsed.series, granularity)
            .iter()
            .map(|p| p.value)
            .sum();
        assert!((bucketed - raw_total).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_disjoint_year_over_year_uploads_trigger_alignment() {
    let jan_2023 = month_of_points("Jan 2023", 2023, 1, 0.0);
    let jan_2024 = month_of_points("Jan 2024", 2024, 1, 100.0);

    assert!(is_non_overlapping(&[jan_2023, jan_2024]));
}

#[test]
fn test_alignment_drops_points_before_anchor() {
    let data = vec![
        DataPoint::new(date(2024, 1, 1), 5.0),
        DataPoint::new(date(2024, 1, 2), 6.0),
    ];
    let aligned = align(&data, date(2024, 1, 2), Granularity::Daily);

    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].day_offset, 0);
    assert_eq!(aligned[0].value, 6.0);
    assert_eq!(aligned[0].original_date, date(2024, 1, 2));
}

#[test]
fn test_full_pipeline_disjoint_uploads_to_comparison_table() -> Result<()> {
    let mut workspace = Workspace::new();

    let first = parse_grid(
        &grid_from_csv("Date,Revenue\n2023-01-01,10\n2023-01-02,20\n2023-01-03,30\n")?,
        None,
    )?;
    let second = parse_grid(
        &grid_from_csv("Date,Revenue\n2024-01-01,11\n2024-01-03,33\n")?,
        None,
    )?;
    workspace.add_parsed(first, "jan-2023.csv", None);
    workspace.add_parsed(second, "jan-2024.csv", None);

    assert!(workspace.needs_alignment());
    workspace.auto_set_alignment_dates();

    let view = workspace.comparison_view(Granularity::Daily, &[]);
    assert_eq!(view.offsets, vec![0, 1, 2]);
    assert_eq!(view.table[0].values, vec![Some(10.0), Some(11.0)]);
    assert_eq!(view.table[1].values, vec![Some(20.0), None]);
    assert_eq!(view.table[2].values, vec![Some(30.0), Some(33.0)]);
    Ok(())
}

#[test]
fn test_metric_switch_survives_workspace_round_trip() -> Result<()> {
    let csv = "Date,Revenue,Sessions\n2024-01-01,100,17\n2024-01-02,200,23\n";
    let grid = grid_from_csv(csv)?;

    let mut workspace = Workspace::new();
    let id = workspace.add_parsed(parse_grid(&grid, None)?, "upload.csv", None);

    workspace.switch_metric(id, "Sessions")?;

    // Re-derivation from the retained table matches a fresh parse with the
    // metric selected up front
    let direct = parse_grid(&grid, Some("Sessions"))?;
    assert_eq!(workspace.get(id).unwrap().data, direct.series);
    Ok(())
}

#[test]
fn test_date_filter_then_partition_keeps_every_point() -> Result<()> {
    let mut csv = String::from("Date,Clicks\n");
    for day in 1..=20 {
        csv.push_str(&format!("2024-03-{:02},{}\n", day, day));
    }
    let parsed = parse_grid(&grid_from_csv(&csv)?, None)?;

    let clipped = filter_by_date_range(
        &parsed.series,
        &DateRange::new(date(2024, 3, 5), date(2024, 3, 15)),
    );
    assert_eq!(clipped.len(), 11);

    let periods = vec![ColorPeriod {
        id: "launch".to_string(),
        start_date: date(2024, 3, 8),
        end_date: date(2024, 3, 10),
        color: "#f00".to_string(),
        label: "Launch".to_string(),
    }];
    let groups = partition_by_color(&clipped, &periods, "#ccc");
    let total: usize = groups.iter().map(|g| g.data.len()).sum();
    assert_eq!(total, clipped.len());
    Ok(())
}

#[test]
fn test_fetched_report_joins_uploaded_series() -> Result<()> {
    let report: FetchedReport = serde_json::from_str(
        r#"{
            "rows": [
                {"date": "20230101", "activeUsers": "5"},
                {"date": "20230102", "activeUsers": "8"}
            ],
            "dimension_headers": ["date"],
            "metric_headers": ["activeUsers"],
            "row_count": 2
        }"#,
    )?;

    let mut workspace = Workspace::new();
    let uploaded = parse_grid(
        &grid_from_csv("Date,activeUsers\n2024-01-01,7\n2024-01-02,9\n")?,
        None,
    )?;
    workspace.add_parsed(uploaded, "upload.csv", None);
    let fetched = workspace.add_report(&report, Some("GA4: activeUsers"), None);

    assert_eq!(workspace.get(fetched).unwrap().unit.as_deref(), Some("count"));
    assert!(workspace.needs_alignment());

    workspace.auto_set_alignment_dates();
    let view = workspace.comparison_view(Granularity::Daily, &[]);
    assert_eq!(view.table[0].values, vec![Some(7.0), Some(5.0)]);
    assert_eq!(view.table[1].values, vec![Some(9.0), Some(8.0)]);
    Ok(())
}

#[test]
fn test_single_file_failure_is_isolated() -> Result<()> {
    let good = grid_from_csv("Date,Revenue\n2024-01-01,100\n")?;
    let bad = grid_from_csv("Month,Revenue\nJan,100\n")?;

    let mut workspace = Workspace::new();
    let mut failures = Vec::new();

    for (name, grid) in [("good.csv", good), ("bad.csv", bad)] {
        match parse_grid(&grid, None) {
            Ok(table) => {
                workspace.add_parsed(table, name, None);
            }
            Err(err) => failures.push(format!("{}: {}", name, err)),
        }
    }

    assert_eq!(workspace.len(), 1);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("bad.csv"));
    Ok(())
}
