//! 메모리 사용량 프로브.
//!
//! sysinfo 기반. 에이전트 프로세스 메모리와 시스템 메모리를 주기적으로
//! 샘플링하여 스냅샷의 memory 필드를 채운다.

use nuri_core::models::vitals::MemoryUsage;
use parking_lot::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::warn;

/// sysinfo 기반 메모리 프로브
pub struct MemoryProbe {
    sys: Mutex<System>,
    pid: Option<Pid>,
}

impl MemoryProbe {
    /// 새 메모리 프로브 생성
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                // 프로세스 PID를 못 얻는 플랫폼에서는 memory가 None으로 남는다
                warn!("현재 프로세스 PID 조회 실패: {e}");
                None
            }
        };

        Self {
            sys: Mutex::new(System::new()),
            pid,
        }
    }

    /// 현재 메모리 사용량 샘플링
    ///
    /// 플랫폼 미지원 또는 프로세스 조회 실패 시 None.
    pub fn sample(&self) -> Option<MemoryUsage> {
        let pid = self.pid?;
        let mut sys = self.sys.lock();

        sys.refresh_memory();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = sys.process(pid)?;

        Some(MemoryUsage {
            used_bytes: process.memory(),
            total_bytes: sys.used_memory(),
            limit_bytes: sys.total_memory(),
        })
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}
