//! Rebase queue engine.
//!
//! One queue, one worker. Tasks are processed strictly FIFO, one at a time,
//! including the whole polling sequence, and the two broker mutation calls of
//! a rebase are never in flight alongside anything else. A fixed delay after
//! every task keeps the broker API from being burst. The sequencing trades
//! throughput for predictable load on a rate-limited broker and is part of
//! the engine's contract, not an implementation accident.
//!
//! Queue contents live in memory only; a process restart loses whatever is
//! queued or in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use alert_trade_core::{risk_prices, AccountConfig, BrokerGateway, RebaseSettings, Signal};

use crate::task::{RebaseError, RebaseOutcome, RebaseState, RebaseTask};

enum QueueMessage {
    Task(Box<RebaseTask>),
    Shutdown,
}

/// Read-only queue introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    pub length: usize,
    pub worker_busy: bool,
    pub completed_count: u64,
}

#[derive(Default)]
struct QueueCounters {
    length: AtomicUsize,
    worker_busy: AtomicBool,
    completed: AtomicU64,
}

/// Cloneable front of the engine: concurrent producers enqueue through it
/// while the single worker drains the queue.
#[derive(Clone)]
pub struct RebaseHandle {
    tx: mpsc::UnboundedSender<QueueMessage>,
    counters: Arc<QueueCounters>,
    outcome_tx: broadcast::Sender<RebaseOutcome>,
}

impl RebaseHandle {
    /// Appends a task at the tail of the queue. Non-blocking; returns
    /// immediately. If the worker has shut down the task is dropped with a
    /// warning rather than an error, matching the engine's isolation rule.
    pub fn enqueue(
        &self,
        order_id: String,
        account: AccountConfig,
        original_alert_price: Decimal,
        client_id: String,
        account_id: String,
        signal: Signal,
    ) {
        let task = RebaseTask::new(
            order_id,
            account,
            original_alert_price,
            client_id,
            account_id,
            signal,
        );
        self.counters.length.fetch_add(1, Ordering::SeqCst);
        if self
            .tx
            .send(QueueMessage::Task(Box::new(task)))
            .is_err()
        {
            self.counters.length.fetch_sub(1, Ordering::SeqCst);
            warn!("rebase queue worker is gone; task dropped");
        }
    }

    #[must_use]
    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            length: self.counters.length.load(Ordering::SeqCst),
            worker_busy: self.counters.worker_busy.load(Ordering::SeqCst),
            completed_count: self.counters.completed.load(Ordering::SeqCst),
        }
    }

    /// Subscribes to terminal outcomes. Subscribe before enqueueing to see
    /// every outcome.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RebaseOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Asks the worker to stop after the task it is currently processing.
    pub fn shutdown(&self) {
        let _ = self.tx.send(QueueMessage::Shutdown);
    }
}

pub struct RebaseEngine {
    gateway: Arc<dyn BrokerGateway>,
    settings: RebaseSettings,
    rx: mpsc::UnboundedReceiver<QueueMessage>,
    counters: Arc<QueueCounters>,
    outcome_tx: broadcast::Sender<RebaseOutcome>,
}

impl RebaseEngine {
    /// Spawns the single worker task and returns the producer handle.
    #[must_use]
    pub fn spawn(gateway: Arc<dyn BrokerGateway>, settings: RebaseSettings) -> RebaseHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (outcome_tx, _) = broadcast::channel(256);
        let counters = Arc::new(QueueCounters::default());

        let engine = Self {
            gateway,
            settings,
            rx,
            counters: Arc::clone(&counters),
            outcome_tx: outcome_tx.clone(),
        };
        tokio::spawn(engine.run());

        RebaseHandle {
            tx,
            counters,
            outcome_tx,
        }
    }

    async fn run(mut self) {
        info!(
            max_poll_attempts = self.settings.max_poll_attempts,
            poll_interval_ms = self.settings.poll_interval_ms,
            inter_task_delay_ms = self.settings.inter_task_delay_ms,
            "rebase queue worker started"
        );

        while let Some(msg) = self.rx.recv().await {
            let task = match msg {
                QueueMessage::Task(task) => task,
                QueueMessage::Shutdown => break,
            };

            self.counters.length.fetch_sub(1, Ordering::SeqCst);
            self.counters.worker_busy.store(true, Ordering::SeqCst);

            let outcome = self.process(*task).await;

            self.counters.completed.fetch_add(1, Ordering::SeqCst);
            self.counters.worker_busy.store(false, Ordering::SeqCst);
            let _ = self.outcome_tx.send(outcome);

            tokio::time::sleep(Duration::from_millis(self.settings.inter_task_delay_ms)).await;
        }

        info!("rebase queue worker stopped");
    }

    /// Drives one task from `Queued` to a terminal state. Errors from the
    /// gateway are contained here; nothing propagates out of the worker loop.
    async fn process(&self, mut task: RebaseTask) -> RebaseOutcome {
        task.state = RebaseState::Polling;

        let (planned_sl, planned_tp) = risk_prices(
            task.original_alert_price,
            task.signal,
            task.account.stop_loss_pct,
            task.account.target_pct,
        );

        let fill_price = self.poll_fill_price(&mut task).await;
        let mut outcome = RebaseOutcome {
            order_id: task.order_id.clone(),
            account_id: task.account_id.clone(),
            client_id: task.client_id.clone(),
            state: task.state,
            attempts_made: task.attempts_made,
            original_alert_price: task.original_alert_price,
            fill_price,
            deviation_pct: None,
            stop_loss_price: planned_sl,
            target_price: planned_tp,
            new_stop_loss: None,
            new_target: None,
            error: None,
        };

        let Some(fill) = fill_price else {
            task.state = RebaseState::Abandoned;
            let err = RebaseError::NoFillPrice {
                attempts: self.settings.max_poll_attempts,
            };
            warn!(
                order_id = %task.order_id,
                account_id = %task.account_id,
                "abandoning rebase: {err}"
            );
            outcome.state = task.state;
            outcome.attempts_made = task.attempts_made;
            outcome.error = Some(err.to_string());
            return outcome;
        };
        outcome.attempts_made = task.attempts_made;

        let deviation_pct = (fill - task.original_alert_price).abs()
            / task.original_alert_price
            * Decimal::ONE_HUNDRED;
        outcome.deviation_pct = Some(deviation_pct);

        if deviation_pct < task.account.rebase_threshold_pct {
            task.state = RebaseState::Skipped;
            info!(
                order_id = %task.order_id,
                account_id = %task.account_id,
                %fill,
                %deviation_pct,
                threshold = %task.account.rebase_threshold_pct,
                "deviation below threshold, keeping original stop-loss/target"
            );
            outcome.state = task.state;
            return outcome;
        }

        task.state = RebaseState::Rebasing;
        let (new_sl, new_tp) = risk_prices(
            fill,
            task.signal,
            task.account.stop_loss_pct,
            task.account.target_pct,
        );
        outcome.new_stop_loss = Some(new_sl);
        outcome.new_target = Some(new_tp);

        // Target first, then stop-loss. On either failure the original
        // prices stay live at the broker; nothing is rolled back.
        if let Err(e) = self.gateway.update_target_price(&task.order_id, new_tp).await {
            let err = RebaseError::TargetUpdateFailed(format!("{e:#}"));
            warn!(order_id = %task.order_id, "{err}");
            task.state = RebaseState::RebaseFailed;
            outcome.state = task.state;
            outcome.error = Some(err.to_string());
            return outcome;
        }
        if let Err(e) = self.gateway.update_stop_loss(&task.order_id, new_sl).await {
            let err = RebaseError::StopLossUpdateFailed(format!("{e:#}"));
            warn!(order_id = %task.order_id, "{err}");
            task.state = RebaseState::RebaseFailed;
            outcome.state = task.state;
            outcome.error = Some(err.to_string());
            return outcome;
        }

        task.state = RebaseState::Rebased;
        info!(
            order_id = %task.order_id,
            account_id = %task.account_id,
            %fill,
            new_target = %new_tp,
            new_stop_loss = %new_sl,
            "order rebased to fill price"
        );
        outcome.state = task.state;
        outcome
    }

    /// Polls the broker for a fill price, up to the attempt budget, sleeping
    /// the fixed interval between attempts. A gateway error or an in-transit
    /// report both consume an attempt, so the budget bounds wall-clock time
    /// even against a flapping broker.
    async fn poll_fill_price(&self, task: &mut RebaseTask) -> Option<Decimal> {
        for attempt in 1..=self.settings.max_poll_attempts {
            task.attempts_made = attempt;

            match self.gateway.order_status(&task.order_id).await {
                Ok(report) => {
                    if let Some(price) = report.fill_price() {
                        debug!(
                            order_id = %task.order_id,
                            attempt,
                            %price,
                            "fill price obtained"
                        );
                        return Some(price);
                    }
                    debug!(
                        order_id = %task.order_id,
                        attempt,
                        status = %report.status,
                        "order has no fill price yet"
                    );
                }
                Err(e) => {
                    warn!(
                        order_id = %task.order_id,
                        attempt,
                        "order status poll failed: {e:#}"
                    );
                }
            }

            if attempt < self.settings.max_poll_attempts {
                tokio::time::sleep(Duration::from_millis(self.settings.poll_interval_ms)).await;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_trade_core::{OrderAck, OrderRequest, OrderStatusReport, OrderType};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct Script {
        /// Polls that report "in transit" before the fill appears.
        transit_polls: u32,
        /// Polls that fail outright before anything else.
        error_polls: u32,
        fill_price: Option<Decimal>,
        fail_target_update: bool,
        fail_stop_update: bool,
    }

    impl Script {
        fn fills_at(price: Decimal) -> Self {
            Self {
                transit_polls: 0,
                error_polls: 0,
                fill_price: Some(price),
                fail_target_update: false,
                fail_stop_update: false,
            }
        }

        fn never_fills() -> Self {
            Self {
                transit_polls: 0,
                error_polls: 0,
                fill_price: None,
                fail_target_update: false,
                fail_stop_update: false,
            }
        }
    }

    #[derive(Default)]
    struct MockGateway {
        scripts: Mutex<HashMap<String, Script>>,
        poll_counts: Mutex<HashMap<String, u32>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockGateway {
        fn with_script(order_id: &str, script: Script) -> Arc<Self> {
            let gateway = Arc::new(Self::default());
            gateway.add_script(order_id, script);
            gateway
        }

        fn add_script(&self, order_id: &str, script: Script) {
            self.scripts
                .lock()
                .unwrap()
                .insert(order_id.to_string(), script);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BrokerGateway for MockGateway {
        async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
            self.calls.lock().unwrap().push(format!("place:{}", order.ticker));
            Ok(OrderAck {
                order_id: "ORDER".to_string(),
            })
        }

        async fn order_status(&self, order_id: &str) -> Result<OrderStatusReport> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("status:{order_id}"));
            let script = self
                .scripts
                .lock()
                .unwrap()
                .get(order_id)
                .cloned()
                .expect("no script for order");
            let polls = {
                let mut counts = self.poll_counts.lock().unwrap();
                let entry = counts.entry(order_id.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };

            if polls <= script.error_polls {
                bail!("gateway timeout");
            }
            let filled = script
                .fill_price
                .filter(|_| polls > script.error_polls + script.transit_polls);
            match filled {
                Some(price) => Ok(OrderStatusReport {
                    status: "complete".to_string(),
                    price: Decimal::ZERO,
                    average_price: Some(price),
                }),
                None => Ok(OrderStatusReport {
                    status: "in transit".to_string(),
                    price: Decimal::ZERO,
                    average_price: None,
                }),
            }
        }

        async fn update_target_price(&self, order_id: &str, _new_price: Decimal) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("target:{order_id}"));
            let fail = self.scripts.lock().unwrap()[order_id].fail_target_update;
            if fail {
                bail!("target rejected");
            }
            Ok(())
        }

        async fn update_stop_loss(&self, order_id: &str, _new_price: Decimal) -> Result<()> {
            self.calls.lock().unwrap().push(format!("stop:{order_id}"));
            let fail = self.scripts.lock().unwrap()[order_id].fail_stop_update;
            if fail {
                bail!("stop-loss rejected");
            }
            Ok(())
        }
    }

    fn account(rebase_threshold_pct: Decimal) -> AccountConfig {
        AccountConfig {
            account_id: "ACC1".to_string(),
            client_id: "CLIENT1".to_string(),
            available_funds: dec!(100000),
            leverage: dec!(1),
            risk_on_capital: dec!(0.5),
            min_order_value: dec!(0),
            max_order_value: dec!(10000000),
            max_position_size_pct: dec!(100),
            stop_loss_pct: dec!(0.0075),
            target_pct: dec!(0.01),
            rebase_enabled: true,
            rebase_threshold_pct,
            allow_duplicate_tickers: false,
            order_type: OrderType::Market,
            limit_buffer_pct: dec!(0.001),
            is_active: true,
        }
    }

    fn settings() -> RebaseSettings {
        RebaseSettings::default()
    }

    fn enqueue(handle: &RebaseHandle, order_id: &str, account: AccountConfig, price: Decimal, signal: Signal) {
        handle.enqueue(
            order_id.to_string(),
            account,
            price,
            "CLIENT1".to_string(),
            "ACC1".to_string(),
            signal,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn small_deviation_is_skipped_without_broker_mutation() {
        // 250.50 -> 251.45 is a 0.379% move, below the 0.5% threshold.
        let gateway = MockGateway::with_script("O1", Script::fills_at(dec!(251.45)));
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "O1", account(dec!(0.5)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::Skipped);
        assert_eq!(outcome.attempts_made, 1);
        assert_eq!(outcome.fill_price, Some(dec!(251.45)));
        // Original alert-price basis reported unchanged.
        assert_eq!(outcome.target_price, dec!(253.0050));
        assert_eq!(outcome.stop_loss_price, dec!(248.621250));
        assert_eq!(outcome.new_target, None);
        assert_eq!(outcome.new_stop_loss, None);
        assert!(outcome.error.is_none());

        let deviation = outcome.deviation_pct.unwrap();
        assert!(deviation > dec!(0.37) && deviation < dec!(0.39));

        // No mutation calls reached the broker.
        assert_eq!(gateway.calls(), vec!["status:O1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn deviation_at_or_above_threshold_rebases_target_then_stop() {
        // Same fill, tighter threshold: 0.379% >= 0.1% forces a rebase.
        let gateway = MockGateway::with_script("O1", Script::fills_at(dec!(251.45)));
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "O1", account(dec!(0.1)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::Rebased);
        assert_eq!(outcome.new_target, Some(dec!(253.9645)));
        assert_eq!(outcome.new_stop_loss, Some(dec!(249.563875)));

        // Exactly two mutation calls, target before stop-loss.
        assert_eq!(
            gateway.calls(),
            vec!["status:O1", "target:O1", "stop:O1"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sell_fill_inside_threshold_is_skipped() {
        // Short at 209.19 filling at 209.45 deviates ~0.124%, inside 2%.
        let gateway = MockGateway::with_script("O1", Script::fills_at(dec!(209.45)));
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "O1", account(dec!(2)), dec!(209.19), Signal::Sell);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::Skipped);
        let deviation = outcome.deviation_pct.unwrap();
        assert!(deviation > dec!(0.12) && deviation < dec!(0.13));
    }

    #[tokio::test(start_paused = true)]
    async fn in_transit_polls_consume_attempts_until_fill() {
        let gateway = MockGateway::with_script(
            "O1",
            Script {
                transit_polls: 2,
                ..Script::fills_at(dec!(251.45))
            },
        );
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        let started = tokio::time::Instant::now();
        enqueue(&handle, "O1", account(dec!(0.1)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.attempts_made, 3);
        assert_eq!(outcome.state, RebaseState::Rebased);
        // Two inter-attempt sleeps of 3000 ms each.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(6000));
        assert!(elapsed < Duration::from_millis(6500), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn never_filling_order_is_abandoned_after_budget() {
        let gateway = MockGateway::with_script("O1", Script::never_fills());
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        let started = tokio::time::Instant::now();
        enqueue(&handle, "O1", account(dec!(0.5)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::Abandoned);
        assert_eq!(outcome.attempts_made, 5);
        assert_eq!(outcome.fill_price, None);
        assert!(outcome.error.as_deref().unwrap().contains("5 attempts"));

        // Four inter-attempt waits; no sleep after the final attempt.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(12000));
        assert!(elapsed < Duration::from_millis(12500), "elapsed {elapsed:?}");

        // Abandonment never mutates the broker.
        assert!(gateway.calls().iter().all(|c| c.starts_with("status:")));
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_errors_consume_attempts_too() {
        let gateway = MockGateway::with_script(
            "O1",
            Script {
                error_polls: 5,
                ..Script::fills_at(dec!(251.45))
            },
        );
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "O1", account(dec!(0.5)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::Abandoned);
        assert_eq!(outcome.attempts_made, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_target_update_terminates_task_without_stop_call() {
        let gateway = MockGateway::with_script(
            "O1",
            Script {
                fail_target_update: true,
                ..Script::fills_at(dec!(251.45))
            },
        );
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "O1", account(dec!(0.1)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::RebaseFailed);
        assert!(outcome.error.as_deref().unwrap().contains("target"));
        // Attempted values carried for diagnostics.
        assert_eq!(outcome.new_target, Some(dec!(253.9645)));
        // The stop-loss call never happened.
        assert_eq!(gateway.calls(), vec!["status:O1", "target:O1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_stop_loss_update_reports_rebase_failed() {
        let gateway = MockGateway::with_script(
            "O1",
            Script {
                fail_stop_update: true,
                ..Script::fills_at(dec!(251.45))
            },
        );
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "O1", account(dec!(0.1)), dec!(250.50), Signal::Buy);
        let outcome = outcomes.recv().await.unwrap();

        assert_eq!(outcome.state, RebaseState::RebaseFailed);
        assert!(outcome.error.as_deref().unwrap().contains("stop-loss"));
        assert_eq!(
            gateway.calls(),
            vec!["status:O1", "target:O1", "stop:O1"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_run_fifo_one_at_a_time() {
        let gateway = Arc::new(MockGateway::default());
        for id in ["A", "B", "C"] {
            gateway.add_script(
                id,
                Script {
                    transit_polls: 1,
                    ..Script::fills_at(dec!(251.45))
                },
            );
        }
        let handle = RebaseEngine::spawn(gateway.clone(), settings());
        let mut outcomes = handle.subscribe();

        // Concurrent producers: clones of the handle enqueue in a known order.
        for id in ["A", "B", "C"] {
            enqueue(&handle, id, account(dec!(0.1)), dec!(250.50), Signal::Buy);
        }

        let mut finished = Vec::new();
        for _ in 0..3 {
            finished.push(outcomes.recv().await.unwrap().order_id);
        }
        assert_eq!(finished, vec!["A", "B", "C"]);

        // Every call for a task happens before any call of the next task:
        // the worker never interleaves two tasks.
        let expected: Vec<String> = ["A", "B", "C"]
            .iter()
            .flat_map(|id| {
                vec![
                    format!("status:{id}"),
                    format!("status:{id}"),
                    format!("target:{id}"),
                    format!("stop:{id}"),
                ]
            })
            .collect();
        assert_eq!(gateway.calls(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn inter_task_delay_separates_tasks() {
        let gateway = Arc::new(MockGateway::default());
        gateway.add_script("A", Script::fills_at(dec!(251.45)));
        gateway.add_script("B", Script::fills_at(dec!(251.45)));
        let handle = RebaseEngine::spawn(gateway, settings());
        let mut outcomes = handle.subscribe();

        let started = tokio::time::Instant::now();
        enqueue(&handle, "A", account(dec!(0.5)), dec!(250.50), Signal::Buy);
        enqueue(&handle, "B", account(dec!(0.5)), dec!(250.50), Signal::Buy);

        let first = outcomes.recv().await.unwrap();
        let first_at = started.elapsed();
        let second = outcomes.recv().await.unwrap();
        let second_at = started.elapsed();

        assert_eq!(first.order_id, "A");
        assert_eq!(second.order_id, "B");
        // The 500 ms inter-task delay sits between the two completions.
        assert!(second_at - first_at >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn queue_status_tracks_length_and_completions() {
        let gateway = Arc::new(MockGateway::default());
        gateway.add_script("A", Script::fills_at(dec!(251.45)));
        gateway.add_script("B", Script::fills_at(dec!(251.45)));
        let handle = RebaseEngine::spawn(gateway, settings());
        let mut outcomes = handle.subscribe();

        enqueue(&handle, "A", account(dec!(0.5)), dec!(250.50), Signal::Buy);
        enqueue(&handle, "B", account(dec!(0.5)), dec!(250.50), Signal::Buy);

        // Worker has not been polled yet: both tasks still queued.
        assert_eq!(handle.status().length, 2);
        assert_eq!(handle.status().completed_count, 0);

        outcomes.recv().await.unwrap();
        outcomes.recv().await.unwrap();

        let status = handle.status();
        assert_eq!(status.length, 0);
        assert_eq!(status.completed_count, 2);
        assert!(!status.worker_busy);
    }
}
