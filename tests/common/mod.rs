#![allow(dead_code)]

use std::path::Path;

use event_unfurl_lambda_rust::model::event::columns;
use event_unfurl_lambda_rust::model::row::RawRow;
use rust_xlsxwriter::Workbook;

/// Header row of the published events export, in sheet order.
pub const HEADERS: &[&str] = &[
    columns::GAME_ID,
    columns::GROUP,
    columns::TITLE,
    columns::SHORT_DESCRIPTION,
    columns::LONG_DESCRIPTION,
    columns::EVENT_TYPE,
    columns::GAME_SYSTEM,
    columns::RULES_EDITION,
    columns::MIN_PLAYERS,
    columns::MAX_PLAYERS,
    columns::AGE_REQUIRED,
    columns::EXPERIENCE_REQUIRED,
    columns::MATERIALS_REQUIRED,
    columns::MATERIALS_DETAILS,
    columns::START_DATETIME,
    columns::DURATION,
    columns::END_DATETIME,
    columns::GM_NAMES,
    columns::WEBSITE,
    columns::EMAIL,
    columns::TOURNAMENT,
    columns::ROUND_NUMBER,
    columns::TOTAL_ROUNDS,
    columns::MIN_PLAY_TIME,
    columns::ATTENDEE_REGISTRATION,
    columns::COST,
    columns::LOCATION,
    columns::ROOM_NAME,
    columns::TABLE_NUMBER,
    columns::SPECIAL_CATEGORY,
    columns::TICKETS_AVAILABLE,
    columns::LAST_MODIFIED,
];

#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

/// A typical row: the given id and title, a Thursday evening start, four hours, $12.
pub fn event_row<'a>(game_id: &'a str, title: &'a str) -> Vec<(&'static str, Cell<'a>)> {
    vec![
        (columns::GAME_ID, Cell::Text(game_id)),
        (columns::GROUP, Cell::Text("Test Group")),
        (columns::TITLE, Cell::Text(title)),
        (columns::EVENT_TYPE, Cell::Text("RPG - Roleplaying Game")),
        (columns::START_DATETIME, Cell::Text("08/14/2025 6:00 PM")),
        (columns::DURATION, Cell::Text("4")),
        (columns::COST, Cell::Text("12")),
        (columns::LOCATION, Cell::Text("ICC")),
        (columns::ROOM_NAME, Cell::Text("Room 101")),
    ]
}

/// Write a single-sheet workbook. Cells whose header is not in `headers` are dropped;
/// an empty row leaves a blank line in the sheet.
pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<(&str, Cell<'_>)>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("write header");
    }
    for (idx, row) in rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (name, cell) in row {
            let Some(col) = headers.iter().position(|h| h == name) else { continue };
            match cell {
                Cell::Text(value) => sheet.write_string(row_num, col as u16, *value).expect("write text"),
                Cell::Number(value) => sheet.write_number(row_num, col as u16, *value).expect("write number"),
            };
        }
    }
    workbook.save(path).expect("save workbook");
}

/// A parser input with every header present and only the given cells filled.
pub fn raw_row(cells: &[(&str, &str)]) -> RawRow {
    let mut row: RawRow = HEADERS.iter().map(|h| (*h, None)).collect();
    for (header, value) in cells {
        row.insert(*header, Some(value.to_string()));
    }
    row
}
