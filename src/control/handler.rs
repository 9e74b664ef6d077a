//! Control command surface
//!
//! ASCII request/response verbs over the framed channel:
//!
//! | request                | response                         |
//! |------------------------|----------------------------------|
//! | `GET HEALTH`           | `HEALTH OK\|DEGRADED\|ERROR`     |
//! | `GET STATS`            | `STATS` + one `key=value` line per counter |
//! | `SET LOG_LEVEL=<L>`    | `OK LOG_LEVEL=<L>`, applied to the journal |
//! | `SET CRC=ON\|OFF`      | `OK CRC=<val>`, applied to the gateway flag |
//! | `SET <KEY>=<VAL>`      | `OK <KEY>=<VAL>`, stored in the config map |
//!
//! Verbs match case-insensitively; recognized keys and their values are
//! uppercased. Errors come back inline as `ERR <KIND>` and never close the
//! connection.

use crate::gateway::StatsAggregator;
use crate::journal::EventJournal;
use crate::protocol::Severity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Parses commands and applies them to the runtime configuration
pub struct CommandHandler {
    stats: Arc<StatsAggregator>,
    journal: Arc<EventJournal>,
    /// Gateway-side CRC switch, shared as a published atomic.
    crc_enabled: Arc<AtomicBool>,
    config: HashMap<String, String>,
}

impl CommandHandler {
    pub fn new(
        stats: Arc<StatsAggregator>,
        journal: Arc<EventJournal>,
        crc_enabled: Arc<AtomicBool>,
    ) -> Self {
        CommandHandler {
            stats,
            journal,
            crc_enabled,
            config: HashMap::new(),
        }
    }

    /// Process one request string into one response string.
    pub fn handle(&mut self, command: &str) -> String {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return "ERR EMPTY_COMMAND".to_string();
        }

        let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim_start()),
            None => (trimmed, ""),
        };

        match verb.to_ascii_uppercase().as_str() {
            "GET" => self.handle_get(rest),
            "SET" => self.handle_set(rest),
            _ => "ERR UNKNOWN_COMMAND".to_string(),
        }
    }

    fn handle_get(&self, args: &str) -> String {
        match args.trim().to_ascii_uppercase().as_str() {
            "HEALTH" => format!("HEALTH {}", self.stats.health().as_str()),
            "STATS" => {
                let g = self.stats.global_snapshot();
                format!(
                    "STATS\nrx_total={}\nmalformed_total={}\ngap_total={}\nreorder_total={}\nduplicate_total={}\ncrc_fail_total={}",
                    g.rx_total,
                    g.malformed_total,
                    g.gap_total,
                    g.reorder_total,
                    g.duplicate_total,
                    g.crc_fail_total
                )
            }
            _ => "ERR UNKNOWN_COMMAND".to_string(),
        }
    }

    fn handle_set(&mut self, args: &str) -> String {
        let (key, value) = match args.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => return "ERR INVALID_SET_SYNTAX".to_string(),
        };

        let key = key.to_ascii_uppercase();
        match key.as_str() {
            "LOG_LEVEL" => {
                let value = value.to_ascii_uppercase();
                match Severity::from_name(&value) {
                    Some(level) => {
                        self.journal.set_level(level);
                        self.config.insert(key, value.clone());
                        format!("OK LOG_LEVEL={}", value)
                    }
                    None => "ERR INVALID_LOG_LEVEL".to_string(),
                }
            }
            "CRC" => match value.to_ascii_uppercase().as_str() {
                "ON" => {
                    self.crc_enabled.store(true, Ordering::Relaxed);
                    self.config.insert(key, "ON".to_string());
                    "OK CRC=ON".to_string()
                }
                "OFF" => {
                    self.crc_enabled.store(false, Ordering::Relaxed);
                    self.config.insert(key, "OFF".to_string());
                    "OK CRC=OFF".to_string()
                }
                _ => "ERR INVALID_CRC_VALUE".to_string(),
            },
            _ => {
                // Unrecognized keys are stored verbatim for operators; the
                // gateway does not consume them.
                self.config.insert(key.clone(), value.to_string());
                format!("OK {}={}", key, value)
            }
        }
    }

    /// Look up a stored config value (testing / introspection).
    pub fn get_config(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn crc_enabled(&self) -> bool {
        self.crc_enabled.load(Ordering::Relaxed)
    }
}
