use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

// ── Habit tracker records ────────────────────────────────────────────────────

/// How a habit is measured.
///
/// The tracker stores this as an integer code in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitKind {
    /// Checked off (or not) once per day.
    YesNo,
    /// A measured quantity per day, compared against a target value.
    Numerical,
}

impl HabitKind {
    /// Map a raw `type` column code to the habit kind, `None` for codes the
    /// tracker does not define.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::YesNo),
            1 => Some(Self::Numerical),
            _ => None,
        }
    }

    /// The integer code the tracker stores for this kind.
    pub fn code(self) -> i64 {
        match self {
            Self::YesNo => 0,
            Self::Numerical => 1,
        }
    }
}

/// Interpretation of a repetition `value` for yes/no habits.
///
/// Numeric habits store arbitrary magnitudes in the same column, so
/// [`RepetitionEntry::value`] stays a raw integer and this enum is the
/// decoding helper for the yes/no case.
///
/// # Examples
///
/// ```
/// use lifelog_core::models::EntryValue;
///
/// assert_eq!(EntryValue::from_code(2), Some(EntryValue::YesManual));
/// assert_eq!(EntryValue::from_code(7), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryValue {
    /// The day is explicitly skipped and does not break a streak.
    Skip,
    /// Completed, marked by the user.
    YesManual,
    /// Completed, derived automatically by the tracker.
    YesAuto,
    /// Not completed.
    No,
    /// No information recorded for the day.
    Unknown,
}

impl EntryValue {
    /// Map a raw `value` column code to its meaning, `None` for codes the
    /// tracker does not define.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            3 => Some(Self::Skip),
            2 => Some(Self::YesManual),
            1 => Some(Self::YesAuto),
            0 => Some(Self::No),
            -1 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The integer code the tracker stores for this value.
    pub fn code(self) -> i64 {
        match self {
            Self::Skip => 3,
            Self::YesManual => 2,
            Self::YesAuto => 1,
            Self::No => 0,
            Self::Unknown => -1,
        }
    }
}

/// One habit definition row, fields in the export's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Primary key within the export.
    pub id: i64,
    /// Non-zero when the habit is archived (hidden from the main list).
    pub archived: i64,
    /// Palette index of the habit's display colour.
    pub color: i64,
    /// Free-text description shown under the habit name.
    pub description: String,
    /// Frequency denominator: repetitions per `freq_den` days.
    pub freq_den: i64,
    /// Frequency numerator.
    pub freq_num: i64,
    /// Legacy display flag, always 0 in current exports.
    pub highlight: i64,
    /// Display name of the habit.
    pub name: String,
    /// Manual sort position in the tracker's list.
    pub position: i64,
    /// Reminder hour of day, `None` when no reminder is set.
    pub reminder_hour: Option<i64>,
    /// Reminder minute of hour, `None` when no reminder is set.
    pub reminder_min: Option<i64>,
    /// Bitmask of weekdays the reminder fires on.
    pub reminder_days: i64,
    /// Measurement kind code, decoded by [`HabitKind::from_code`].
    pub kind: i64,
    /// Whether a numeric target is an at-least or at-most goal.
    pub target_type: i64,
    /// Daily target for numeric habits.
    pub target_value: f64,
    /// Unit label for numeric habits.
    pub unit: String,
    /// The question the tracker asks when checking in.
    pub question: String,
    /// Stable unique identifier across devices.
    pub uuid: String,
}

/// One habit check-in, joined to its habit's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionEntry {
    /// Name of the habit this entry belongs to. Always one of the names in
    /// the same export's habit table.
    pub name: String,
    /// Calendar day the entry is recorded for.
    pub date: NaiveDate,
    /// Raw value code; see [`EntryValue`] for the yes/no interpretation.
    pub value: i64,
    /// Free-text note attached to the check-in.
    pub notes: String,
}

// ── Activity log records ─────────────────────────────────────────────────────

/// Kind tag of an activity log event.
///
/// The log format defines exactly one kind; any other tag on the wire is a
/// parse failure rather than a silently-accepted variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityEventKind {
    /// A sample of the foreground window taken by the activity logger.
    ActiveWindowEvent,
}

/// One foreground-window sample from the activity log.
///
/// This struct is the wire format: each JSONL line deserialises directly
/// into it (durations travel as integer seconds, the kind tag as `"type"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event kind tag.
    #[serde(rename = "type")]
    pub kind: ActivityEventKind,
    /// Local wall-clock time of the sample, no timezone attached.
    pub time: NaiveDateTime,
    /// How long the window stayed in the foreground.
    #[serde(with = "duration_seconds")]
    pub duration: TimeDelta,
    /// Machine the sample was taken on.
    pub hostname: String,
    /// User the logger ran as.
    pub username: String,
    /// How long the user had been idle when the sample was taken.
    #[serde(with = "duration_seconds")]
    pub idle_for: TimeDelta,
    /// Filesystem path of the foreground process.
    pub process_path: String,
    /// User-assigned tags, often empty.
    pub tags: Vec<String>,
}

// ── Screen-time records ──────────────────────────────────────────────────────

/// Time spent in one app on one day, on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTimeRecord {
    /// Calendar day of the measurement.
    pub date: NaiveDate,
    /// App display name or package identifier, as the source provides it.
    pub app: String,
    /// Total foreground time for the day.
    #[serde(with = "duration_micros")]
    pub duration: TimeDelta,
    /// Device label; empty when the source has no device dimension.
    pub device: String,
}

/// Number of times one app was opened on one day, on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCountRecord {
    /// Calendar day of the measurement.
    pub date: NaiveDate,
    /// App display name, as the source provides it.
    pub app: String,
    /// Number of times the app was opened.
    pub count: i64,
    /// Device label; empty when the source has no device dimension.
    pub device: String,
}

/// Number of device unlocks on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockCountRecord {
    /// Calendar day of the measurement.
    pub date: NaiveDate,
    /// Number of unlocks.
    pub count: i64,
}

// ── Duration (de)serialisation helpers ───────────────────────────────────────

/// Serde representation of a [`TimeDelta`] as whole seconds.
///
/// The activity log writes durations this way; second granularity
/// round-trips exactly.
pub mod duration_seconds {
    use chrono::TimeDelta;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("duration out of range: {secs}s")))
    }
}

/// Serde representation of a [`TimeDelta`] as integer microseconds.
///
/// Used for screen-time records, whose sources mix second-granular cells
/// with millisecond counters.
pub mod duration_micros {
    use chrono::TimeDelta;
    use serde::{ser::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        let micros = d
            .num_microseconds()
            .ok_or_else(|| S::Error::custom("duration overflows microseconds"))?;
        serializer.serialize_i64(micros)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let micros = i64::deserialize(deserializer)?;
        Ok(TimeDelta::microseconds(micros))
    }
}
