//! Single-shot listing, the watch loop, and agent inspection.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use console::style;
use subctl_store::AgentStore;
use tokio::sync::watch;
use tracing::Instrument;

use super::render;
use crate::config::MonitorConfig;
use crate::domain::{Result, Snapshot};
use crate::fetcher::SnapshotFetcher;
use crate::liveness;
use crate::obs;

/// Optional sections of the inspection view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectSections {
    pub logs: bool,
    pub tools: bool,
    pub tokens: bool,
    pub packages: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectOutcome {
    Found,
    NotFound,
}

/// Composes fetch, liveness filtering and rendering into terminal views.
pub struct Presenter {
    fetcher: SnapshotFetcher,
    max_age: chrono::Duration,
    recent_events: usize,
}

impl Presenter {
    pub fn new(fetcher: SnapshotFetcher, config: &MonitorConfig) -> Self {
        Self {
            fetcher,
            max_age: config.max_age,
            recent_events: config.recent_events,
        }
    }

    pub fn from_store(store: Arc<dyn AgentStore>, config: &MonitorConfig) -> Self {
        Self::new(SnapshotFetcher::new(store, config.entry_policy), config)
    }

    /// The snapshot a listing shows: everything, or only active agents.
    pub async fn snapshot(&self, include_stale: bool) -> Snapshot {
        let all = self.fetcher.fetch_all().await.into_value();
        if include_stale {
            all
        } else {
            liveness::active_now(&all, self.max_age)
        }
    }

    /// Fetch once and render. Returns the number of agents shown.
    pub async fn list_once<W: Write>(&self, out: &mut W, include_stale: bool) -> Result<usize> {
        let snapshot = self.snapshot(include_stale).await;
        let view = if snapshot.is_empty() {
            render::render_empty_notice(include_stale)
        } else {
            render::render_table(&snapshot)
        };
        out.write_all(view.as_bytes())?;
        out.flush()?;
        Ok(snapshot.len())
    }

    /// Render every `refresh` until `shutdown` turns true or its sender is dropped.
    ///
    /// Shutdown is only observed between cycles, so a started render always
    /// completes. Returns the number of cycles rendered.
    pub async fn watch<W: Write>(
        &self,
        out: &mut W,
        include_stale: bool,
        refresh: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Result<u64> {
        self.watch_loop(out, include_stale, refresh, shutdown)
            .instrument(obs::watch_span(refresh, include_stale))
            .await
    }

    async fn watch_loop<W: Write>(
        &self,
        out: &mut W,
        include_stale: bool,
        refresh: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<u64> {
        writeln!(out, "{}", style("Real-time Agent Monitoring").bold().blue())?;

        let mut cycles = 0u64;
        while !*shutdown.borrow_and_update() {
            let shown = self.list_once(out, include_stale).await?;
            cycles += 1;
            obs::emit_watch_cycle(cycles, shown);

            if pause(refresh, &mut shutdown).await {
                break;
            }
        }

        writeln!(out, "\n{}", style("Monitoring stopped").dim())?;
        out.flush()?;
        obs::emit_watch_stopped(cycles);
        Ok(cycles)
    }

    /// Print the identity block and requested sections for `label`.
    ///
    /// Looks in the full snapshot, so stale agents are found too.
    pub async fn inspect<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        sections: InspectSections,
    ) -> Result<InspectOutcome> {
        let snapshot = self.snapshot(true).await;
        let Some(record) = snapshot.get(label) else {
            writeln!(out, "{}", style(format!("Agent {label} not found")).red())?;
            out.flush()?;
            return Ok(InspectOutcome::NotFound);
        };

        let mut view = render::render_identity(record);
        if sections.logs {
            view.push_str(&render::render_section_header(&format!(
                "Recent Activity (last {} minutes)",
                self.max_age.num_minutes()
            )));
            // No representable cutoff means every logged event is recent.
            let cutoff = Utc::now().checked_sub_signed(self.max_age);
            let events = self
                .fetcher
                .fetch_events(label, self.recent_events)
                .await
                .into_value();
            for event in events
                .iter()
                .filter(|e| cutoff.map_or(true, |cutoff| e.timestamp >= cutoff))
            {
                view.push_str(&render::render_event(event));
            }
        }
        if sections.tools {
            view.push_str(&render::render_section_header("Recent Tool Calls"));
        }
        if sections.tokens {
            view.push_str(&render::render_section_header("Token Usage"));
        }
        if sections.packages {
            view.push_str(&render::render_section_header("Package Compliance"));
        }

        out.write_all(view.as_bytes())?;
        out.flush()?;
        Ok(InspectOutcome::Found)
    }
}

/// Sleep for `refresh`, waking early only to stop. Returns true to stop.
async fn pause(refresh: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(refresh);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow_and_update() {
                    return true;
                }
            }
        }
    }
}
