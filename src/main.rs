use std::io::{self, Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ulid::Ulid;

use reservo::config::Config;
use reservo::limits::{
    MAX_PATTERN_LEN, MAX_SLOT_STEPS, MAX_VALID_TIMESTAMP_MS, MIN_VALID_TIMESTAMP_MS,
};
use reservo::manager::bounded_slot_end;
use reservo::{
    calendar, Admission, AvailabilityGroup, AvailabilityManager, AvailabilityPattern, Engine, Ms,
    Quota, Reservation, ReservationRule, ReservationSystem,
};

// ── Request / response types ─────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum Request {
    Match {
        pattern: String,
        at: DateTime<Utc>,
    },
    MatchRange {
        pattern: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Explain {
        pattern: String,
    },
    #[serde(rename_all = "camelCase")]
    Slots {
        patterns: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step_minutes: u32,
    },
    Quota {
        quota: Quota,
        schedules: Vec<DateTime<Utc>>,
        now: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    CanReserve {
        #[serde(default)]
        groups: Vec<AvailabilityGroup>,
        #[serde(default)]
        rules: Vec<ReservationRule>,
        #[serde(default)]
        reservations: Vec<ReservationInput>,
        user_id: Ulid,
        group_id: Ulid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Reserve {
        #[serde(default)]
        groups: Vec<AvailabilityGroup>,
        #[serde(default)]
        rules: Vec<ReservationRule>,
        #[serde(default)]
        reservations: Vec<ReservationInput>,
        group_id: Ulid,
        requests: Vec<ReservationInput>,
    },
}

/// A reservation with RFC 3339 instants. The id is generated when omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationInput {
    #[serde(default = "Ulid::new")]
    id: Ulid,
    user_id: Ulid,
    resource_id: Ulid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl From<ReservationInput> for Reservation {
    fn from(r: ReservationInput) -> Self {
        Reservation::new(
            r.id,
            r.user_id,
            r.resource_id,
            r.start.timestamp_millis(),
            r.end.timestamp_millis(),
        )
    }
}

#[derive(Debug, Serialize)]
struct OkResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrResponse {
    ok: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct MatchResult {
    matches: bool,
}

#[derive(Debug, Serialize)]
struct ExplainResult {
    canonical: String,
    labelled: String,
}

#[derive(Debug, Serialize)]
struct SlotsResult {
    slots: Vec<DateTime<Utc>>,
    truncated: bool,
    skipped: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotaResult {
    available: bool,
    period_start: Option<DateTime<Utc>>,
    period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdmissionResult {
    admitted: bool,
    reason: &'static str,
    rule_id: Option<Ulid>,
}

impl From<Admission> for AdmissionResult {
    fn from(admission: Admission) -> Self {
        let (reason, rule_id) = match admission {
            Admission::Admitted => ("admitted", None),
            Admission::UnknownGroup => ("unknownGroup", None),
            Admission::Rejected { rule_id } => ("rejected", Some(rule_id)),
        };
        Self {
            admitted: admission.is_admitted(),
            reason,
            rule_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReserveOutcome {
    id: Ulid,
    admitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReserveResult {
    results: Vec<ReserveOutcome>,
}

// ── Helpers ──────────────────────────────────────────────

fn write_ok<T: Serialize>(data: T) {
    let resp = OkResponse { ok: true, data };
    let json = serde_json::to_string(&resp)
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"serialization error: {e}\"}}"));
    println!("{json}");
    let _ = io::stdout().flush();
}

fn write_err(msg: impl std::fmt::Display) -> ! {
    let resp = ErrResponse {
        ok: false,
        error: msg.to_string(),
    };
    let json = serde_json::to_string(&resp)
        .unwrap_or_else(|_| "{\"ok\":false,\"error\":\"double serialization error\"}".to_string());
    println!("{json}");
    let _ = io::stdout().flush();
    std::process::exit(1);
}

fn check_pattern_len(pattern: &str) {
    if pattern.len() > MAX_PATTERN_LEN {
        write_err(format!("pattern longer than {MAX_PATTERN_LEN} bytes"));
    }
}

fn parse_pattern(pattern: &str) -> AvailabilityPattern {
    check_pattern_len(pattern);
    AvailabilityPattern::parse(pattern).unwrap_or_else(|e| write_err(e))
}

fn check_timestamp_range(start: Ms, end: Ms) {
    if start < MIN_VALID_TIMESTAMP_MS || end > MAX_VALID_TIMESTAMP_MS {
        write_err("timestamp out of range");
    }
}

fn instant(at: Ms) -> Option<DateTime<Utc>> {
    calendar::to_utc(at)
}

fn build_system(
    groups: Vec<AvailabilityGroup>,
    rules: Vec<ReservationRule>,
    reservations: Vec<ReservationInput>,
) -> ReservationSystem {
    let mut system = ReservationSystem::new();
    for group in groups {
        system.add_availability_group(group);
    }
    for rule in rules {
        system.add_reservation_rule(rule);
    }
    for reservation in reservations {
        system.add_reservation(reservation.into());
    }
    system
}

// ── Entry point ──────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let config = Config::from_env();

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        write_err(format!("failed to read stdin: {e}"));
    }

    let request: Request = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => write_err(format!("invalid JSON input: {e}")),
    };

    match request {
        Request::Match { pattern, at } => {
            let matches = parse_pattern(&pattern).matches(at.timestamp_millis());
            write_ok(MatchResult { matches });
        }
        Request::MatchRange { pattern, start, end } => {
            let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
            let matches = parse_pattern(&pattern).matches_range(start, end);
            write_ok(MatchResult { matches });
        }
        Request::Explain { pattern } => {
            let pattern = parse_pattern(&pattern);
            write_ok(ExplainResult {
                canonical: pattern.to_string(),
                labelled: format!("{pattern:#}"),
            });
        }
        Request::Slots {
            patterns,
            start,
            end,
            step_minutes,
        } => {
            let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
            check_timestamp_range(start, end);
            for pattern in &patterns {
                check_pattern_len(pattern);
            }

            let mut manager = AvailabilityManager::new(Quota::new(0, Default::default()));
            let skipped = patterns.iter().filter(|p| !manager.add_pattern(p)).count();
            let window_end = bounded_slot_end(start, end, step_minutes, MAX_SLOT_STEPS);
            let mut slots: Vec<DateTime<Utc>> = manager
                .available_slots(start, window_end.unwrap_or(end), step_minutes)
                .take(config.max_slots + 1)
                .filter_map(instant)
                .collect();
            let truncated = slots.len() > config.max_slots || window_end.is_some();
            slots.truncate(config.max_slots);
            write_ok(SlotsResult {
                slots,
                truncated,
                skipped,
            });
        }
        Request::Quota {
            quota,
            schedules,
            now,
        } => {
            let manager = AvailabilityManager::new(quota);
            let schedules: Vec<Ms> = schedules.iter().map(DateTime::timestamp_millis).collect();
            let now = now.unwrap_or_else(Utc::now).timestamp_millis();
            let period = manager.period(now);
            write_ok(QuotaResult {
                available: manager.is_quota_available(&schedules, now),
                period_start: period.and_then(|p| instant(p.start)),
                period_end: period.and_then(|p| instant(p.end)),
            });
        }
        Request::CanReserve {
            groups,
            rules,
            reservations,
            user_id,
            group_id,
            start,
            end,
        } => {
            let system = build_system(groups, rules, reservations);
            let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
            let admission = system.admission(user_id, group_id, start, end);
            write_ok(AdmissionResult::from(admission));
        }
        Request::Reserve {
            groups,
            rules,
            reservations,
            group_id,
            requests,
        } => {
            let engine = Engine::with_system(build_system(groups, rules, reservations))
                .with_max_span(config.max_span_ms);
            let mut results = Vec::with_capacity(requests.len());
            for request in requests {
                let reservation: Reservation = request.into();
                let id = reservation.id;
                match engine.reserve(group_id, reservation).await {
                    Ok(()) => results.push(ReserveOutcome {
                        id,
                        admitted: true,
                        error: None,
                    }),
                    Err(e) => {
                        info!("reservation {id} refused: {e}");
                        results.push(ReserveOutcome {
                            id,
                            admitted: false,
                            error: Some(e.to_string()),
                        });
                    }
                }
            }
            write_ok(ReserveResult { results });
        }
    }
}
