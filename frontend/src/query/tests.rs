use super::*;

// 纯状态机测试：时间由测试显式推进，不触碰任何浏览器 API

type Cache = CollectionCache<Vec<&'static str>>;

fn start(cache: &mut Cache, now: f64) -> u64 {
    match cache.begin(now, false) {
        FetchPlan::Start { generation } => generation,
        other => panic!("expected Start, got {:?}", other),
    }
}

#[test]
fn fresh_window_deduplicates_reads() {
    let mut cache = Cache::default();

    // 1. 首次读取回源
    let generation = start(&mut cache, 0.0);
    assert!(cache.succeed(generation, vec!["a"], 1_000.0));
    assert_eq!(cache.status(), QueryStatus::Ready);

    // 2. 窗口内的第二次读取不产生请求
    assert_eq!(cache.begin(60_000.0, false), FetchPlan::Fresh);

    // 3. 超窗后重新回源
    let plan = cache.begin(1_000.0 + FRESHNESS_WINDOW_MS + 1.0, false);
    assert!(matches!(plan, FetchPlan::Start { .. }));
}

#[test]
fn concurrent_readers_share_one_in_flight_request() {
    let mut cache = Cache::default();

    let generation = start(&mut cache, 0.0);
    // 第二、第三个并发读者合并到同一在途请求
    assert_eq!(cache.begin(10.0, false), FetchPlan::Join);
    assert_eq!(cache.begin(20.0, true), FetchPlan::Join);

    assert!(cache.succeed(generation, vec!["a"], 30.0));
    assert_eq!(cache.data(), Some(&vec!["a"]));
}

#[test]
fn manual_refresh_bypasses_freshness() {
    let mut cache = Cache::default();
    let generation = start(&mut cache, 0.0);
    cache.succeed(generation, vec!["a"], 0.0);

    assert_eq!(cache.begin(1.0, false), FetchPlan::Fresh);
    assert!(matches!(cache.begin(1.0, true), FetchPlan::Start { .. }));
}

#[test]
fn read_failure_retries_once_then_settles_errored() {
    let mut cache = Cache::default();
    let generation = start(&mut cache, 0.0);

    // 1. 第一次失败：还有额度，保持 Loading
    let outcome = cache.fail(generation, ApiError::network("down"));
    assert_eq!(outcome, FailOutcome::Retry);
    assert_eq!(cache.status(), QueryStatus::Loading);
    assert!(cache.error().is_none());

    // 2. 重试也失败：定格为 Errored
    let outcome = cache.fail(generation, ApiError::network("still down"));
    assert_eq!(outcome, FailOutcome::Errored);
    assert_eq!(cache.status(), QueryStatus::Errored);
    assert!(cache.error().unwrap().is_network());

    // 3. 手动重试由用户发起，重新获得完整额度
    let generation = match cache.begin(0.0, true) {
        FetchPlan::Start { generation } => generation,
        other => panic!("expected Start, got {:?}", other),
    };
    assert_eq!(
        cache.fail(generation, ApiError::network("down")),
        FailOutcome::Retry
    );
}

#[test]
fn invalidation_discards_a_raced_response() {
    let mut cache = Cache::default();

    // 0. 完成一次加载，并让新鲜窗口过期
    let generation = start(&mut cache, 0.0);
    assert!(cache.succeed(generation, vec!["a"], 0.0));
    let after_window = FRESHNESS_WINDOW_MS + 1.0;

    // 1. 一次后台读取启动
    let stale_generation = match cache.begin(after_window, false) {
        FetchPlan::Start { generation } => generation,
        other => panic!("expected Start, got {:?}", other),
    };

    // 2. 在它返回之前，一个变更成功并使缓存失效
    cache.invalidate();

    // 3. 失效后的读取发起全新请求（不与旧请求合并）
    let fresh_generation = match cache.begin(0.0, false) {
        FetchPlan::Start { generation } => generation,
        other => panic!("expected Start, got {:?}", other),
    };
    assert_ne!(stale_generation, fresh_generation);

    // 4. 抢跑的旧响应被丢弃，不会覆盖新数据
    assert!(!cache.succeed(stale_generation, vec!["stale"], 50.0));
    assert!(cache.succeed(fresh_generation, vec!["b"], 60.0));
    assert_eq!(cache.data(), Some(&vec!["b"]));
}

#[test]
fn invalidation_forces_the_next_read_to_refetch() {
    let mut cache = Cache::default();
    let generation = start(&mut cache, 0.0);
    cache.succeed(generation, vec!["a"], 0.0);

    // 窗口内本应 Fresh，但失效后必须回源
    cache.invalidate();
    assert!(!cache.is_fresh(1.0));
    assert!(matches!(cache.begin(1.0, false), FetchPlan::Start { .. }));

    // 旧数据在重取落地前仍可展示
    assert_eq!(cache.data(), Some(&vec!["a"]));
}

#[test]
fn stale_generation_failures_are_discarded() {
    let mut cache = Cache::default();
    let generation = start(&mut cache, 0.0);
    cache.invalidate();

    assert_eq!(
        cache.fail(generation, ApiError::network("late")),
        FailOutcome::Discarded
    );
    // 丢弃不会污染错误状态
    assert!(cache.error().is_none());
}

#[test]
fn reset_returns_to_cold_state() {
    let mut cache = Cache::default();
    let generation = start(&mut cache, 0.0);
    cache.succeed(generation, vec!["a"], 0.0);

    cache = Cache::default();
    assert_eq!(cache.status(), QueryStatus::Idle);
    assert!(cache.data().is_none());
}
