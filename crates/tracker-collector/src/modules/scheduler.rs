//! 고정 주기 작업 스케줄러.
//!
//! 등록된 작업마다 독립 태스크를 띄우고 broadcast 채널로 종료 신호를
//! 전파합니다. 같은 작업의 실행은 절대 겹치지 않습니다: 루프가 핸들러
//! 완료를 기다린 뒤에야 다음 tick을 받고, 실행 중 밀린 tick은
//! 건너뜁니다.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 주기 작업 스케줄러
pub struct Scheduler {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    /// 새 스케줄러 생성
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// 이름 붙은 주기 작업 등록 및 시작.
    ///
    /// 첫 실행은 등록 즉시 시작되고, 이후 `period` 간격으로 반복됩니다.
    /// 각 실행은 별도 태스크에서 돌아가므로 핸들러 패닉은 `JoinError`
    /// 로그로 끝나고, 해당 작업의 다음 주기 실행은 그대로 일어납니다.
    pub fn spawn_job<F, Fut>(&mut self, name: &'static str, period: Duration, mut run: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shutdown_tx = self.shutdown_tx.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            // 첫 실행 — 종료 신호 감지 가능
            {
                let mut first_shutdown = shutdown_tx.subscribe();
                // 핸들러는 별도 태스크에서 실행: 패닉이 나도 작업 루프는
                // 살아남아 다음 주기에 다시 실행된다
                let mut run_handle = tokio::spawn(run());
                tokio::select! {
                    result = &mut run_handle => {
                        match result {
                            Ok(()) => info!(
                                job = name,
                                period_secs = period.as_secs(),
                                "첫 실행 완료"
                            ),
                            Err(e) => error!(job = name, error = %e, "핸들러 비정상 종료"),
                        }
                    }
                    _ = first_shutdown.recv() => {
                        info!(job = name, "첫 실행 중 종료 신호 수신");
                        run_handle.abort();
                        return;
                    }
                }
            }

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // 첫 tick 즉시 반환 (소비)

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(job = name, "종료 신호 수신");
                        break;
                    }
                    _ = interval.tick() => {
                        // 핸들러 실행 중에도 종료 신호 감지
                        let mut inner_shutdown = shutdown_tx.subscribe();
                        let mut run_handle = tokio::spawn(run());
                        tokio::select! {
                            result = &mut run_handle => {
                                if let Err(e) = result {
                                    error!(job = name, error = %e, "핸들러 비정상 종료");
                                }
                            }
                            _ = inner_shutdown.recv() => {
                                info!(job = name, "실행 중 종료 신호 수신");
                                run_handle.abort();
                                break;
                            }
                        }
                    }
                }
            }
        });

        self.handles.push((name, handle));
    }

    /// 종료 신호를 보내고 모든 작업이 끝나기를 기다립니다.
    ///
    /// 패닉으로 죽은 작업은 로그만 남기고 나머지 작업 종료를 계속
    /// 기다립니다.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(job = name, error = %e, "작업 비정상 종료");
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
