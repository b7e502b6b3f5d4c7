use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use card_pipeline::models::{flatten_orders, parse_orders, EventKind, OrderRecord};
use card_pipeline::orchestrator::StageSnapshot;
use card_pipeline::{App, Config, Coordinator, Pipeline, PipelineEvent, PipelineSettings, StageSequence};
use tokio::sync::mpsc;

/// 从 TOML 文本构建工序序列
fn sequence_from(toml_text: &str) -> StageSequence {
    let settings: PipelineSettings = toml::from_str(toml_text).expect("设置格式错误");
    settings.build_sequence().expect("设置校验失败")
}

fn orders_from(json: &str) -> Vec<OrderRecord> {
    parse_orders(json, "inline").expect("订单格式错误")
}

fn collect(events: &mut mpsc::UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

/// 跑完整个流水线，返回全部事件和各工序快照
async fn run_to_completion(
    sequence: StageSequence,
    orders: &[OrderRecord],
) -> (Vec<PipelineEvent>, Vec<StageSnapshot>, Arc<Coordinator>) {
    let batches = flatten_orders(orders).expect("订单校验失败");
    let (coordinator, mut events) = Coordinator::new(sequence);
    coordinator.seed(batches).await;

    let pipeline = Pipeline::start(coordinator.clone());
    pipeline.run_until_drained().await;

    let snapshots = coordinator.snapshots().await;
    (collect(&mut events), snapshots, coordinator)
}

fn started_at<'a>(events: &'a [PipelineEvent], stage: &str) -> Vec<&'a PipelineEvent> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Started && e.stage == stage)
        .collect()
}

fn finished_per_row(events: &[PipelineEvent]) -> BTreeMap<(usize, u64), u64> {
    let mut finished = BTreeMap::new();
    for event in events.iter().filter(|e| e.kind == EventKind::Finished) {
        *finished.entry((event.order_seq, event.card_id)).or_default() += event.quantity;
    }
    finished
}

fn assert_conserved(orders: &[OrderRecord], events: &[PipelineEvent]) {
    let finished = finished_per_row(events);
    for (order_seq, order) in orders.iter().enumerate() {
        for row in &order.rows {
            assert_eq!(
                finished.get(&(order_seq, row.cardid)).copied().unwrap_or(0),
                row.quantity as u64,
                "订单 {} 卡片 {} 完成数量不守恒",
                order.order,
                row.cardid
            );
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_large_row_is_claimed_in_capacity_sized_pieces() {
    let sequence = sequence_from(
        r#"
        stages = ["paper", "pack"]
        first_stage = "paper"
        times = { paper = 20, pack = 30 }
        counts = { paper = 3, pack = 1 }
        capacities = { paper = 40, pack = 100 }
        "#,
    );
    let orders = orders_from(r#"[{ "order": 1, "rows": [{ "cardid": 9, "quantity": 100, "priority": 0 }] }]"#);

    let (events, snapshots, _) = run_to_completion(sequence, &orders).await;

    let sizes: Vec<u64> = started_at(&events, "paper").iter().map(|e| e.quantity).collect();
    assert_eq!(sizes, vec![40, 40, 20]);
    assert_eq!(snapshots[0].peak_busy, 3);
    assert_conserved(&orders, &events);
}

#[tokio::test(start_paused = true)]
async fn test_split_pieces_merge_downstream_in_priority_order() {
    let sequence = sequence_from(
        r#"
        stages = ["paper", "pack"]
        first_stage = "paper"
        times = { paper = 10, pack = 100 }
        counts = { paper = 3, pack = 1 }
        capacities = { paper = 10, pack = 100 }
        "#,
    );
    let orders = orders_from(
        r#"[
            { "order": 1, "rows": [{ "cardid": 1, "quantity": 25, "priority": 0 }] },
            { "order": 2, "rows": [{ "cardid": 2, "quantity": 3, "priority": 0 }] }
        ]"#,
    );

    let (events, snapshots, _) = run_to_completion(sequence, &orders).await;

    // 卡片 1 拆成 10/10/5 三片并行；5 片最先完成，随后卡片 2 也先于两个 10 片完成
    let paper_finished: Vec<(u64, u64)> = events
        .iter()
        .filter(|e| e.kind == EventKind::Finished && e.stage == "paper")
        .map(|e| (e.card_id, e.quantity))
        .collect();
    assert_eq!(paper_finished, vec![(1, 5), (2, 3), (1, 10), (1, 10)]);

    // pack 忙于 5 片期间，两个 10 片在下游合并成一条，并排在卡片 2 之前
    let pack: Vec<(u64, u64)> = started_at(&events, "pack")
        .iter()
        .map(|e| (e.card_id, e.quantity))
        .collect();
    assert_eq!(pack, vec![(1, 5), (1, 20), (2, 3)]);

    assert_eq!(snapshots[1].claims, 3);
    assert_eq!(snapshots[1].peak_queue_depth, 2);
    assert_conserved(&orders, &events);
}

#[tokio::test(start_paused = true)]
async fn test_earlier_order_is_dequeued_first() {
    let sequence = sequence_from(
        r#"
        stages = ["paper", "pack"]
        first_stage = "paper"
        times = { paper = 10, pack = 10 }
        counts = { paper = 1, pack = 1 }
        capacities = { paper = 1000, pack = 1000 }
        "#,
    );
    // 订单 0 的行优先级 5，订单 1 的行优先级 1：订单 0 仍然先处理
    let orders = orders_from(
        r#"[
            { "order": 7, "rows": [{ "cardid": 1, "quantity": 5, "priority": 5 }] },
            { "order": 8, "rows": [{ "cardid": 2, "quantity": 5, "priority": 1 }] }
        ]"#,
    );

    let (events, _, _) = run_to_completion(sequence, &orders).await;

    let paper: Vec<(usize, i64)> = started_at(&events, "paper")
        .iter()
        .map(|e| (e.order_seq, e.order_id))
        .collect();
    assert_eq!(paper, vec![(0, 7), (1, 8)]);

    let finished: Vec<usize> = events
        .iter()
        .filter(|e| e.kind == EventKind::Finished)
        .map(|e| e.order_seq)
        .collect();
    assert_eq!(finished, vec![0, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_intra_order_priority_at_first_stage() {
    let sequence = sequence_from(
        r#"
        stages = ["paper"]
        first_stage = "paper"
        times = { paper = 5 }
        counts = { paper = 1 }
        capacities = { paper = 100 }
        "#,
    );
    let orders = orders_from(
        r#"[{ "order": 1, "rows": [
            { "cardid": 1, "quantity": 3, "priority": 10 },
            { "cardid": 2, "quantity": 3, "priority": 9 },
            { "cardid": 3, "quantity": 3, "priority": 1 }
        ] }]"#,
    );

    let (events, _, _) = run_to_completion(sequence, &orders).await;

    let cards: Vec<u64> = started_at(&events, "paper").iter().map(|e| e.card_id).collect();
    assert_eq!(cards, vec![3, 2, 1]);
    // 单道工序时首道工序即最后一道工序
    assert_eq!(
        events.iter().filter(|e| e.kind == EventKind::Finished).count(),
        3
    );
}

#[tokio::test(start_paused = true)]
async fn test_default_pipeline_conserves_units_and_bounds_concurrency() {
    let orders = orders_from(
        r#"[
            { "order": 1, "rows": [
                { "cardid": 101, "quantity": 130, "priority": 2 },
                { "cardid": 102, "quantity": 45, "priority": 1 },
                { "cardid": 103, "quantity": 7, "priority": 3 }
            ] },
            { "order": 2, "rows": [
                { "cardid": 101, "quantity": 60, "priority": 1 },
                { "cardid": 104, "quantity": 200, "priority": 12 }
            ] },
            { "order": 3, "rows": [
                { "cardid": 105, "quantity": 1, "priority": 0 }
            ] }
        ]"#,
    );
    let mut sequence = PipelineSettings::default().build_sequence().unwrap();
    let max_row = card_pipeline::models::max_row_quantity(&orders);
    sequence.ensure_row_capacity(max_row);

    let (events, snapshots, coordinator) = run_to_completion(sequence.clone(), &orders).await;

    assert_conserved(&orders, &events);
    assert_eq!(coordinator.finished_units(), 443);
    assert_eq!(coordinator.total_units(), 443);

    for (snapshot, spec) in snapshots.iter().zip(sequence.stages()) {
        assert!(
            snapshot.peak_busy <= spec.worker_count,
            "{} 峰值忙碌 {} 超过工位数 {}",
            snapshot.stage,
            snapshot.peak_busy,
            spec.worker_count
        );
        // 每道工序都恰好处理了全部单位
        assert_eq!(snapshot.units_claimed, 443);
        assert_eq!(snapshot.queue_depth, 0);
        assert_eq!(snapshot.busy, 0);

        for event in started_at(&events, &snapshot.stage) {
            assert!(event.quantity > 0 && event.quantity <= spec.worker_capacity);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_runtime_conserves_units() {
    let sequence = sequence_from(
        r#"
        stages = ["paper", "cut", "assemble", "glue", "pack"]
        first_stage = "paper"
        times = { paper = 0, cut = 1, assemble = 0, glue = 1, pack = 0 }
        counts = { paper = 4, cut = 3, assemble = 5, glue = 2, pack = 4 }
        capacities = { paper = 7, cut = 11, assemble = 3, glue = 13, pack = 5 }
        "#,
    );

    let mut rows = Vec::new();
    for order in 0..6 {
        let cards: Vec<String> = (0..5)
            .map(|card| {
                format!(
                    r#"{{ "cardid": {}, "quantity": {}, "priority": {} }}"#,
                    card,
                    (order * 7 + card * 13) % 40 + 1,
                    (card * 3) % 5
                )
            })
            .collect();
        rows.push(format!(r#"{{ "order": {}, "rows": [{}] }}"#, order, cards.join(",")));
    }
    let orders = orders_from(&format!("[{}]", rows.join(",")));

    let (events, snapshots, coordinator) = run_to_completion(sequence, &orders).await;

    assert_conserved(&orders, &events);
    assert_eq!(coordinator.finished_units(), coordinator.total_units());
    for snapshot in &snapshots {
        assert!(snapshot.peak_busy <= snapshot.worker_count);
        assert_eq!(snapshot.units_claimed, coordinator.total_units());
    }
}

#[tokio::test(start_paused = true)]
async fn test_idle_workers_stay_available_until_shutdown() {
    let sequence = sequence_from(
        r#"
        stages = ["paper", "pack"]
        first_stage = "paper"
        times = { paper = 10, pack = 10 }
        counts = { paper = 2, pack = 2 }
        capacities = { paper = 10, pack = 10 }
        "#,
    );
    let (coordinator, mut events) = Coordinator::new(sequence);
    let pipeline = Pipeline::start(coordinator.clone());

    // 工位先启动并进入空闲等待，之后才投放
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(collect(&mut events).is_empty());

    let orders = orders_from(r#"[{ "order": 1, "rows": [{ "cardid": 4, "quantity": 25, "priority": 0 }] }]"#);
    coordinator.seed(flatten_orders(&orders).unwrap()).await;
    coordinator.wait_drained().await;
    pipeline.shutdown().await;

    let events = collect(&mut events);
    assert_conserved(&orders, &events);
    assert_eq!(started_at(&events, "paper").len(), 3);
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("card_pipeline_{}_{}", std::process::id(), name))
}

#[tokio::test]
async fn test_app_runs_from_files() {
    let input = temp_path("app_input.json");
    let settings = temp_path("app_settings.toml");
    let output = temp_path("app_output.txt");

    tokio::fs::write(
        &input,
        r#"[
            { "order": 1, "rows": [{ "cardid": 1, "quantity": 30, "priority": 1 }] },
            { "order": 2, "rows": [{ "cardid": 2, "quantity": 12, "priority": 0 }] }
        ]"#,
    )
    .await
    .unwrap();
    tokio::fs::write(
        &settings,
        r#"
        stages = ["print", "fold"]
        first_stage = "print"
        times = { print = 1, fold = 1 }
        counts = { print = 1, fold = 1 }
        capacities = { print = 10, fold = 8 }
        "#,
    )
    .await
    .unwrap();

    let config = Config {
        input_file: input.to_string_lossy().to_string(),
        settings_file: settings.to_string_lossy().to_string(),
        output_log_file: output.to_string_lossy().to_string(),
        verbose_logging: false,
    };

    let app = App::initialize(config).await.unwrap();
    // ceil(30/10)=3, ceil(30/8)=4
    let counts: Vec<usize> = app.sequence().stages().iter().map(|s| s.worker_count).collect();
    assert_eq!(counts, vec![3, 4]);

    let summary = app.run().await.unwrap();
    assert_eq!(summary.finished_for(0, 1), 30);
    assert_eq!(summary.finished_for(1, 2), 12);
    assert_eq!(summary.finished_total(), 42);

    let log = tokio::fs::read_to_string(&output).await.unwrap();
    assert!(log.contains("流水线进度日志"));
    assert!(log.lines().count() > summary.total_claims());

    for path in [input, settings, output] {
        let _ = tokio::fs::remove_file(path).await;
    }
}

#[tokio::test]
async fn test_app_rejects_malformed_input_before_scheduling() {
    let input = temp_path("bad_input.json");
    tokio::fs::write(
        &input,
        r#"[{ "order": 1, "rows": [{ "cardid": 1, "quantity": -3, "priority": 1 }] }]"#,
    )
    .await
    .unwrap();

    let config = Config {
        input_file: input.to_string_lossy().to_string(),
        settings_file: temp_path("missing_settings.toml").to_string_lossy().to_string(),
        output_log_file: temp_path("bad_output.txt").to_string_lossy().to_string(),
        verbose_logging: false,
    };

    assert!(App::initialize(config).await.is_err());
    let _ = tokio::fs::remove_file(input).await;
}

#[tokio::test]
async fn test_app_without_rows_still_writes_log_header() {
    let output = temp_path("empty_output.txt");
    let config = Config {
        input_file: temp_path("unused_input.json").to_string_lossy().to_string(),
        settings_file: temp_path("unused_settings.toml").to_string_lossy().to_string(),
        output_log_file: output.to_string_lossy().to_string(),
        verbose_logging: false,
    };
    let sequence = PipelineSettings::default().build_sequence().unwrap();

    let summary = App::with_batches(config, sequence, Vec::new()).run().await.unwrap();
    assert_eq!(summary, Default::default());

    let log = tokio::fs::read_to_string(&output).await.unwrap();
    assert!(log.contains("流水线进度日志"));
    assert!(!log.contains("卡片"));

    let _ = tokio::fs::remove_file(output).await;
}
