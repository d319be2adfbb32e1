//! 患者集合缓存模块
//!
//! 单一缓存键（"患者集合"）的查询层：新鲜度判定、并发去重、
//! 变更后的失效与重取。核心是一个不依赖任何响应式框架的状态机
//! `CollectionCache`，信号包装 `PatientStore` 只负责驱动它。
//!
//! 顺序保证：
//! 1. 同一时刻至多一个在途请求；新鲜窗口内的重复读取不产生网络调用
//! 2. 失效只在变更的网络响应成功返回之后发出
//! 3. 失效会使更早启动的在途响应作废（按代号丢弃），
//!    由失效触发的读取总是拿到最新数据

use leptos::prelude::*;
use leptos::task::spawn_local;
use medflow_shared::protocol::{DeletePatientRequest, UpdatePatientCommand};
use medflow_shared::{CreatePatientRequest, Patient, UpdatePatientRequest};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};

/// 新鲜窗口：2 分钟内的缓存直接复用，不回源
pub const FRESHNESS_WINDOW_MS: f64 = 2.0 * 60.0 * 1000.0;

/// 读路径失败后的自动重试次数；写路径从不自动重试
const READ_AUTO_RETRIES: u8 = 1;

// =========================================================
// 纯状态机
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// 从未加载
    #[default]
    Idle,
    /// 在途请求存在
    Loading,
    /// 持有服务端确认过的数据
    Ready,
    /// 最近一次读取失败（自动重试已用尽）
    Errored,
}

/// `begin` 的裁决
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// 缓存仍新鲜，无需回源
    Fresh,
    /// 已有在途请求，共享其结果
    Join,
    /// 发起新请求；完成时凭代号回写
    Start { generation: u64 },
}

/// 失败回写的裁决
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// 还有自动重试额度，调用方应立即重发
    Retry,
    /// 转入 Errored
    Errored,
    /// 响应对应的代号已过期，丢弃
    Discarded,
}

/// 单键集合缓存条目
///
/// `generation` 在每次失效时递增；在途响应带着启动时的代号回来，
/// 代号不匹配即视为"抢跑"的旧响应，直接丢弃。
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionCache<T> {
    data: Option<T>,
    status: QueryStatus,
    error: Option<ApiError>,
    /// 最近一次成功回写的时刻（毫秒），失效后为 None
    fetched_at: Option<f64>,
    generation: u64,
    in_flight: bool,
    retries_used: u8,
}

impl<T> Default for CollectionCache<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            fetched_at: None,
            generation: 0,
            in_flight: false,
            retries_used: 0,
        }
    }
}

impl<T> CollectionCache<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// 新鲜度判定：有成功回写且未超窗
    pub fn is_fresh(&self, now_ms: f64) -> bool {
        match self.fetched_at {
            Some(at) => now_ms - at < FRESHNESS_WINDOW_MS,
            None => false,
        }
    }

    /// 读取入口。`force` 为手动刷新：跳过新鲜度，但仍与在途请求合并。
    pub fn begin(&mut self, now_ms: f64, force: bool) -> FetchPlan {
        if self.in_flight {
            return FetchPlan::Join;
        }
        if !force && self.is_fresh(now_ms) {
            return FetchPlan::Fresh;
        }

        self.in_flight = true;
        self.status = QueryStatus::Loading;
        self.retries_used = 0;
        FetchPlan::Start {
            generation: self.generation,
        }
    }

    /// 成功回写。代号过期的响应不落地，返回 false。
    pub fn succeed(&mut self, generation: u64, data: T, now_ms: f64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.data = Some(data);
        self.status = QueryStatus::Ready;
        self.error = None;
        self.fetched_at = Some(now_ms);
        self.in_flight = false;
        self.retries_used = 0;
        true
    }

    /// 失败回写。额度内返回 `Retry`（状态保持 Loading），否则定格为 Errored。
    pub fn fail(&mut self, generation: u64, error: ApiError) -> FailOutcome {
        if generation != self.generation {
            return FailOutcome::Discarded;
        }
        if self.retries_used < READ_AUTO_RETRIES {
            self.retries_used += 1;
            return FailOutcome::Retry;
        }
        self.status = QueryStatus::Errored;
        self.error = Some(error);
        self.in_flight = false;
        FailOutcome::Errored
    }

    /// 失效：变更成功后调用。
    ///
    /// 递增代号让所有更早的在途响应作废，同时释放 in_flight，
    /// 保证紧随其后的读取发起一个全新的请求。已展示的数据保留，
    /// 直到下一次成功回写以服务端状态整体替换。
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.fetched_at = None;
        self.in_flight = false;
        if self.status == QueryStatus::Loading {
            self.status = if self.data.is_some() {
                QueryStatus::Ready
            } else {
                QueryStatus::Idle
            };
        }
    }
}

// =========================================================
// 信号包装 (Leptos Store)
// =========================================================

fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// 患者集合缓存的共享句柄
///
/// 通过 Context 在组件间共享；所有读写经由内部的状态机裁决。
#[derive(Clone, Copy)]
pub struct PatientStore {
    cache: RwSignal<CollectionCache<Vec<Patient>>>,
}

impl PatientStore {
    pub fn new() -> Self {
        Self {
            cache: RwSignal::new(CollectionCache::default()),
        }
    }

    // --- 读侧信号 ---

    pub fn patients(&self) -> Signal<Option<Vec<Patient>>> {
        let cache = self.cache;
        Signal::derive(move || cache.with(|c| c.data().cloned()))
    }

    pub fn is_loading(&self) -> Signal<bool> {
        let cache = self.cache;
        Signal::derive(move || cache.with(|c| c.status() == QueryStatus::Loading))
    }

    pub fn load_error(&self) -> Signal<Option<ApiError>> {
        let cache = self.cache;
        Signal::derive(move || cache.with(|c| c.error().cloned()))
    }

    // --- 读路径 ---

    /// 确保集合已加载；新鲜窗口内的重复调用不会产生网络请求
    pub fn ensure_fetched(&self, api: &ApiClient) {
        self.fetch_with(api.clone(), false);
    }

    /// 手动刷新（用户触发）
    pub fn refresh(&self, api: &ApiClient) {
        self.fetch_with(api.clone(), true);
    }

    fn fetch_with(&self, api: ApiClient, force: bool) {
        let plan = self
            .cache
            .try_update(|c| c.begin(now_ms(), force))
            .unwrap_or(FetchPlan::Join);

        let FetchPlan::Start { generation } = plan else {
            return;
        };

        let cache = self.cache;
        spawn_local(async move {
            loop {
                match api.list_patients().await {
                    Ok(data) => {
                        cache.update(|c| {
                            c.succeed(generation, data, now_ms());
                        });
                        break;
                    }
                    Err(err) => {
                        let outcome = cache
                            .try_update(|c| c.fail(generation, err))
                            .unwrap_or(FailOutcome::Discarded);
                        if outcome != FailOutcome::Retry {
                            break;
                        }
                    }
                }
            }
        });
    }

    // --- 写路径 ---
    //
    // 每个写操作恰好一次网络请求，失败不自动重试；
    // 只有在 2xx 响应到达后才失效缓存并触发重取。
    // 失败时缓存原样保留，错误交还给发起操作的 UI。

    pub async fn create(&self, api: &ApiClient, request: CreatePatientRequest) -> ApiResult<Patient> {
        let created = api.create_patient(&request).await?;
        self.invalidate_and_refetch(api);
        Ok(created)
    }

    pub async fn update(
        &self,
        api: &ApiClient,
        id: String,
        patient: UpdatePatientRequest,
    ) -> ApiResult<Patient> {
        let updated = api
            .update_patient(&UpdatePatientCommand { id, patient })
            .await?;
        self.invalidate_and_refetch(api);
        Ok(updated)
    }

    pub async fn remove(&self, api: &ApiClient, id: String) -> ApiResult<()> {
        api.delete_patient(&DeletePatientRequest { id }).await?;
        self.invalidate_and_refetch(api);
        Ok(())
    }

    fn invalidate_and_refetch(&self, api: &ApiClient) {
        self.cache.update(|c| c.invalidate());
        self.ensure_fetched(api);
    }

    /// 注销时清空，避免把上一个会话的数据带入下一个会话
    pub fn reset(&self) {
        self.cache.set(CollectionCache::default());
    }
}

impl Default for PatientStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取患者缓存句柄
pub fn use_patients() -> PatientStore {
    use_context::<PatientStore>().expect("PatientStore should be provided")
}

#[cfg(test)]
mod tests;
