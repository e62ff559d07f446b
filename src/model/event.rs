use std::str::FromStr;

use chrono::{NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::model::row::{RawRow, RowError};

/// Header names of the events spreadsheet.
pub mod columns {
    pub const GAME_ID: &str = "Game ID";
    pub const GROUP: &str = "Group";
    pub const TITLE: &str = "Title";
    pub const SHORT_DESCRIPTION: &str = "Short Description";
    pub const LONG_DESCRIPTION: &str = "Long Description";
    pub const EVENT_TYPE: &str = "Event Type";
    pub const GAME_SYSTEM: &str = "Game System";
    pub const RULES_EDITION: &str = "Rules Edition";
    pub const MIN_PLAYERS: &str = "Minimum Players";
    pub const MAX_PLAYERS: &str = "Maximum Players";
    pub const AGE_REQUIRED: &str = "Age Required";
    pub const EXPERIENCE_REQUIRED: &str = "Experience Required";
    pub const MATERIALS_REQUIRED: &str = "Materials Required";
    pub const MATERIALS_DETAILS: &str = "Materials Required Details";
    pub const START_DATETIME: &str = "Start Date & Time";
    pub const DURATION: &str = "Duration";
    pub const END_DATETIME: &str = "End Date & Time";
    pub const GM_NAMES: &str = "GM Names";
    pub const WEBSITE: &str = "Website";
    pub const EMAIL: &str = "Email";
    pub const TOURNAMENT: &str = "Tournament?";
    pub const ROUND_NUMBER: &str = "Round Number";
    pub const TOTAL_ROUNDS: &str = "Total Rounds";
    pub const MIN_PLAY_TIME: &str = "Minimum Play Time";
    pub const ATTENDEE_REGISTRATION: &str = "Attendee Registration?";
    pub const COST: &str = "Cost $";
    pub const LOCATION: &str = "Location";
    pub const ROOM_NAME: &str = "Room Name";
    pub const TABLE_NUMBER: &str = "Table Number";
    pub const SPECIAL_CATEGORY: &str = "Special Category";
    pub const TICKETS_AVAILABLE: &str = "Tickets Available";
    pub const LAST_MODIFIED: &str = "Last Modified";

    /// Columns that must be present in the header row. Cost, start time and duration
    /// have their own fallbacks and are not listed.
    pub const REQUIRED: &[&str] = &[
        GAME_ID,
        GROUP,
        TITLE,
        SHORT_DESCRIPTION,
        LONG_DESCRIPTION,
        EVENT_TYPE,
        GAME_SYSTEM,
        RULES_EDITION,
        MIN_PLAYERS,
        MAX_PLAYERS,
        AGE_REQUIRED,
        EXPERIENCE_REQUIRED,
        MATERIALS_REQUIRED,
        MATERIALS_DETAILS,
        END_DATETIME,
        GM_NAMES,
        WEBSITE,
        EMAIL,
        TOURNAMENT,
        ROUND_NUMBER,
        TOTAL_ROUNDS,
        MIN_PLAY_TIME,
        ATTENDEE_REGISTRATION,
        LOCATION,
        ROOM_NAME,
        TABLE_NUMBER,
        SPECIAL_CATEGORY,
        TICKETS_AVAILABLE,
        LAST_MODIFIED,
    ];
}

/// Number of trailing `Game ID` characters that form the public event id.
pub const EVENT_ID_LEN: usize = 6;

/// Source timestamp layout, e.g. `08/14/2025 6:00 PM`.
pub const START_FORMAT: &str = "%m/%d/%Y %I:%M %p";
const DISPLAY_FORMAT: &str = "%A, %I:%M %p %Z";

pub const INVALID_DATETIME: &str = "Invalid datetime";
pub const INVALID_DURATION: &str = "Invalid duration";
pub const ZERO_COST: &str = "$0.00";

/// One scheduled session, normalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub event_id: String,
    pub game_id: String,
    pub group: Option<String>,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub event_type: Option<String>,
    pub game_system: Option<String>,
    pub rules_edition: Option<String>,
    pub min_players: Option<String>,
    pub max_players: Option<String>,
    pub age_required: Option<String>,
    pub experience_required: Option<String>,
    pub materials_required: Option<String>,
    pub materials_details: Option<String>,
    /// Eastern time display string, or [`INVALID_DATETIME`].
    pub start_datetime: String,
    /// `N hr` / `N.N hr`, or [`INVALID_DURATION`].
    pub duration: String,
    pub end_datetime: Option<String>,
    pub gm_names: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub tournament: Option<String>,
    pub round_number: Option<String>,
    pub total_rounds: Option<String>,
    pub min_play_time: Option<String>,
    pub attendee_registration: Option<String>,
    /// `$N.NN`.
    pub cost: String,
    pub location: Option<String>,
    pub room_name: Option<String>,
    pub table_number: Option<String>,
    pub special_category: Option<String>,
    pub tickets_available: Option<String>,
    pub last_modified: Option<String>,
}

impl Event {
    /// Build an event from one spreadsheet row.
    ///
    /// Fails when a required header is missing or `Game ID` is empty. Bad costs, start
    /// times and durations fall back to their display defaults instead.
    pub fn from_row(row: &RawRow) -> Result<Self, RowError> {
        use self::columns::*;

        let passthrough = |column: &'static str| -> Result<Option<String>, RowError> {
            Ok(row.required(column)?.map(str::to_owned))
        };

        let game_id = row
            .required(GAME_ID)?
            .filter(|s| !s.is_empty())
            .ok_or(RowError::EmptyValue(GAME_ID))?
            .to_owned();

        Ok(Event {
            event_id: event_id_from_game_id(&game_id).to_owned(),
            group: passthrough(GROUP)?,
            title: passthrough(TITLE)?,
            short_description: passthrough(SHORT_DESCRIPTION)?,
            long_description: passthrough(LONG_DESCRIPTION)?,
            event_type: passthrough(EVENT_TYPE)?,
            game_system: passthrough(GAME_SYSTEM)?,
            rules_edition: passthrough(RULES_EDITION)?,
            min_players: passthrough(MIN_PLAYERS)?,
            max_players: passthrough(MAX_PLAYERS)?,
            age_required: passthrough(AGE_REQUIRED)?,
            experience_required: passthrough(EXPERIENCE_REQUIRED)?,
            materials_required: passthrough(MATERIALS_REQUIRED)?,
            materials_details: passthrough(MATERIALS_DETAILS)?,
            start_datetime: format_start(row.optional(START_DATETIME)),
            duration: format_duration(row.optional(DURATION)),
            end_datetime: passthrough(END_DATETIME)?,
            gm_names: passthrough(GM_NAMES)?,
            website: passthrough(WEBSITE)?,
            email: passthrough(EMAIL)?,
            tournament: passthrough(TOURNAMENT)?,
            round_number: passthrough(ROUND_NUMBER)?,
            total_rounds: passthrough(TOTAL_ROUNDS)?,
            min_play_time: passthrough(MIN_PLAY_TIME)?,
            attendee_registration: passthrough(ATTENDEE_REGISTRATION)?,
            cost: format_cost(row.optional(COST)),
            location: passthrough(LOCATION)?,
            room_name: passthrough(ROOM_NAME)?,
            table_number: passthrough(TABLE_NUMBER)?,
            special_category: passthrough(SPECIAL_CATEGORY)?,
            tickets_available: passthrough(TICKETS_AVAILABLE)?,
            last_modified: passthrough(LAST_MODIFIED)?,
            game_id,
        })
    }
}

/// Last [`EVENT_ID_LEN`] characters of a game id, or the whole id when it is shorter.
/// e.g. `ENT25ND274324` -> `274324`
pub fn event_id_from_game_id(game_id: &str) -> &str {
    game_id
        .char_indices()
        .rev()
        .nth(EVENT_ID_LEN - 1)
        .map_or(game_id, |(idx, _)| &game_id[idx..])
}

/// Render a cost cell as `$N.NN`. Empty, missing or unparseable is free.
pub fn format_cost(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return ZERO_COST.to_string();
    };
    match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(amount) => format!("${:.2}", amount.round_dp(2)),
        Err(e) => {
            warn!(cost = raw, error = %e, "Unparseable cost; using {}", ZERO_COST);
            ZERO_COST.to_string()
        }
    }
}

/// Interpret a naive start time as UTC and render it in US Eastern time.
pub fn format_start(raw: Option<&str>) -> String {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s.trim(), START_FORMAT).ok())
        .map(|naive| {
            Utc.from_utc_datetime(&naive)
                .with_timezone(&chrono_tz::US::Eastern)
                .format(DISPLAY_FORMAT)
                .to_string()
        })
        .unwrap_or_else(|| INVALID_DATETIME.to_string())
}

/// Render a number of hours, keeping one decimal only when there is a fraction.
pub fn format_duration(raw: Option<&str>) -> String {
    match raw.and_then(|s| s.trim().parse::<f64>().ok()).filter(|h| h.is_finite()) {
        Some(hours) if hours.fract() == 0.0 => format!("{:.0} hr", hours),
        Some(hours) => format!("{:.1} hr", hours),
        None => INVALID_DURATION.to_string(),
    }
}
