//! Google Sheets workbook sink.
//!
//! Talks to the Sheets v4 and Drive v3 REST APIs with a bearer access token. Minting the token
//! (service account, `gcloud auth print-access-token`, ...) happens outside this crate.

use std::fmt;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::config::SheetsSection;
use crate::error::{ImportError, ImportResult};
use crate::types::{CellValue, OutputGrid};

use super::GridSink;

/// Minimum size of a newly added worksheet.
pub const MIN_SHEET_ROWS: usize = 1000;
/// Minimum column count of a newly added worksheet.
pub const MIN_SHEET_COLUMNS: usize = 26;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Authorized client for the Sheets and Drive APIs.
#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    token: String,
    sheets_base: String,
    drive_base: String,
}

impl fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsClient")
            .field("sheets_base", &self.sheets_base)
            .field("drive_base", &self.drive_base)
            .field("token_set", &!self.token.is_empty())
            .finish()
    }
}

impl SheetsClient {
    /// Create a client with an explicit access token.
    pub fn new(
        token: impl Into<String>,
        sheets_base: impl Into<String>,
        drive_base: impl Into<String>,
    ) -> ImportResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("volunteer-sheets-import/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            sheets_base: sheets_base.into().trim_end_matches('/').to_string(),
            drive_base: drive_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from config, reading the token from the configured environment variable.
    pub fn from_config(section: &SheetsSection) -> ImportResult<Self> {
        let token = std::env::var(&section.access_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ImportError::Config {
                message: format!(
                    "no access token: environment variable '{}' is unset or empty",
                    section.access_token_env
                ),
            })?;
        Self::new(token.trim(), &section.sheets_api_base, &section.drive_api_base)
    }

    /// Open the spreadsheet titled `name`, creating it if none is visible to the token.
    pub fn open_or_create_workbook(&self, name: &str) -> ImportResult<Workbook> {
        if let Some(id) = self.find_spreadsheet(name)? {
            tracing::info!(workbook = name, id = %id, "opened workbook");
            return Ok(Workbook {
                client: self.clone(),
                spreadsheet_id: id,
                title: name.to_string(),
            });
        }

        tracing::info!(workbook = name, "workbook not found, creating");
        let created: SpreadsheetResource = self.send(
            self.authed(self.http.post(format!("{}/spreadsheets", self.sheets_base)))
                .json(&json!({ "properties": { "title": name } })),
        )?;
        Ok(Workbook {
            client: self.clone(),
            spreadsheet_id: created.spreadsheet_id,
            title: name.to_string(),
        })
    }

    fn find_spreadsheet(&self, name: &str) -> ImportResult<Option<String>> {
        let q = drive_name_query(name);
        let list: DriveFileList = self.send(
            self.authed(self.http.get(format!("{}/files", self.drive_base)))
                .query(&[("q", q.as_str()), ("fields", "files(id,name)"), ("pageSize", "10")]),
        )?;
        for file in &list.files {
            tracing::debug!(name = %file.name, id = %file.id, "accessible spreadsheet");
        }
        Ok(list.files.into_iter().find(|f| f.name == name).map(|f| f.id))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ImportResult<T> {
        let resp = req.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ImportError::SheetsApi {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> ImportResult<Url> {
        let mut url = Url::parse(&self.sheets_base).map_err(|e| ImportError::Config {
            message: format!("invalid sheets api base '{}': {e}", self.sheets_base),
        })?;
        url.path_segments_mut()
            .map_err(|_| ImportError::Config {
                message: format!("sheets api base cannot carry a path: {}", self.sheets_base),
            })?
            .push("spreadsheets")
            .push(spreadsheet_id)
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }
}

/// One spreadsheet; publishes each grid to the worksheet named after it.
#[derive(Debug, Clone)]
pub struct Workbook {
    client: SheetsClient,
    spreadsheet_id: String,
    title: String,
}

impl Workbook {
    /// Spreadsheet id.
    pub fn id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Spreadsheet title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Properties of every worksheet, in current order.
    pub fn worksheets(&self) -> ImportResult<Vec<SheetProperties>> {
        let c = &self.client;
        let resource: SpreadsheetResource = c.send(
            c.authed(c.http.get(format!("{}/spreadsheets/{}", c.sheets_base, self.spreadsheet_id)))
                .query(&[("fields", "spreadsheetId,sheets.properties")]),
        )?;
        Ok(resource.sheets.into_iter().map(|s| s.properties).collect())
    }

    /// Reorder worksheets alphabetically by lowercased title.
    pub fn sort_worksheets(&self) -> ImportResult<()> {
        let requests = sort_requests(&self.worksheets()?);
        if requests.is_empty() {
            return Ok(());
        }
        self.batch_update(requests)?;
        tracing::info!(workbook = %self.title, "sorted worksheets alphabetically");
        Ok(())
    }

    /// Existing worksheet `title` cleared and grown to fit, or a newly added one.
    fn prepare_worksheet(&self, title: &str, rows: usize, cols: usize) -> ImportResult<i64> {
        let existing = self.worksheets()?.into_iter().find(|s| s.title == title);
        match existing {
            Some(sheet) => {
                let c = &self.client;
                let url = c.values_url(&self.spreadsheet_id, &a1_sheet_range(title), ":clear")?;
                let _: JsonValue = c.send(c.authed(c.http.post(url)).json(&json!({})))?;
                if let Some(req) = resize_request(&sheet, rows, cols) {
                    self.batch_update(vec![req])?;
                }
                Ok(sheet.sheet_id)
            }
            None => {
                let resp = self.batch_update(vec![add_sheet_request(title, rows, cols)])?;
                resp.replies
                    .first()
                    .and_then(|r| r.pointer("/addSheet/properties/sheetId"))
                    .and_then(JsonValue::as_i64)
                    .ok_or_else(|| ImportError::SheetsApi {
                        status: 200,
                        message: format!("addSheet reply for '{title}' carried no sheetId"),
                    })
            }
        }
    }

    fn batch_update(&self, requests: Vec<JsonValue>) -> ImportResult<BatchUpdateResponse> {
        let c = &self.client;
        c.send(
            c.authed(c.http.post(format!(
                "{}/spreadsheets/{}:batchUpdate",
                c.sheets_base, self.spreadsheet_id
            )))
            .json(&json!({ "requests": requests })),
        )
    }
}

impl GridSink for Workbook {
    fn publish(&mut self, grid: &OutputGrid) -> ImportResult<()> {
        let total_rows = grid.row_count() + 1;
        let sheet_id = self.prepare_worksheet(&grid.name, total_rows, grid.column_count())?;

        // Nothing to write beyond the clear done above.
        if grid.header.is_empty() {
            return Ok(());
        }

        let range = format!("{}!A1", a1_sheet_range(&grid.name));
        let c = &self.client;
        let url = c.values_url(&self.spreadsheet_id, &range, "")?;
        let _: JsonValue = c.send(
            c.authed(c.http.put(url))
                .query(&[("valueInputOption", "RAW")])
                .json(&json!({
                    "range": range,
                    "majorDimension": "ROWS",
                    "values": grid_values(grid),
                })),
        )?;

        let styling = table_style_requests(sheet_id, grid);
        if !styling.is_empty() {
            self.batch_update(styling)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> ImportResult<()> {
        self.sort_worksheets()
    }
}

/// Worksheet properties as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Numeric sheet id.
    pub sheet_id: i64,
    /// Tab title.
    pub title: String,
    /// Position in the tab bar.
    #[serde(default)]
    pub index: i64,
    /// Current grid size, if reported.
    #[serde(default)]
    pub grid_properties: Option<GridProperties>,
}

/// Row/column counts of a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResource {
    #[serde(default)]
    spreadsheet_id: String,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<JsonValue>,
}

/// Quote a sheet title for A1 notation: `'Title'`, with embedded quotes doubled.
pub fn a1_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn drive_name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(JsonValue::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn cell_json(cell: &CellValue) -> JsonValue {
    match cell {
        CellValue::Empty => JsonValue::String(String::new()),
        CellValue::Text(s) => JsonValue::String(s.clone()),
        CellValue::Serial(v) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())),
    }
}

/// Header plus rows as the JSON value matrix the values API expects.
pub fn grid_values(grid: &OutputGrid) -> Vec<Vec<JsonValue>> {
    let mut values = Vec::with_capacity(grid.row_count() + 1);
    values.push(grid.header.iter().map(|h| JsonValue::String(h.clone())).collect());
    values.extend(grid.rows.iter().map(|row| row.iter().map(cell_json).collect()));
    values
}

fn add_sheet_request(title: &str, rows: usize, cols: usize) -> JsonValue {
    json!({
        "addSheet": {
            "properties": {
                "title": title,
                "gridProperties": {
                    "rowCount": rows.max(MIN_SHEET_ROWS),
                    "columnCount": cols.max(MIN_SHEET_COLUMNS),
                }
            }
        }
    })
}

fn resize_request(sheet: &SheetProperties, rows: usize, cols: usize) -> Option<JsonValue> {
    let current = sheet.grid_properties?;
    if current.row_count >= rows && current.column_count >= cols {
        return None;
    }
    Some(json!({
        "updateSheetProperties": {
            "properties": {
                "sheetId": sheet.sheet_id,
                "gridProperties": {
                    "rowCount": current.row_count.max(rows),
                    "columnCount": current.column_count.max(cols),
                }
            },
            "fields": "gridProperties.rowCount,gridProperties.columnCount"
        }
    }))
}

/// A filter view over the whole grid plus a date-time number format for every `date` column.
///
/// Empty when the grid has no data rows or no columns.
pub fn table_style_requests(sheet_id: i64, grid: &OutputGrid) -> Vec<JsonValue> {
    let num_rows = grid.row_count() + 1;
    let num_cols = grid.column_count();
    if num_rows <= 1 || num_cols == 0 {
        return Vec::new();
    }

    let mut requests = vec![json!({
        "addFilterView": {
            "filter": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": 0,
                    "endRowIndex": num_rows,
                    "startColumnIndex": 0,
                    "endColumnIndex": num_cols,
                }
            }
        }
    })];

    for (i, header) in grid.header.iter().enumerate() {
        if !header.to_lowercase().contains("date") {
            continue;
        }
        requests.push(json!({
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": 1,
                    "endRowIndex": num_rows,
                    "startColumnIndex": i,
                    "endColumnIndex": i + 1,
                },
                "cell": { "userEnteredFormat": { "numberFormat": { "type": "DATE_TIME" } } },
                "fields": "userEnteredFormat.numberFormat"
            }
        }));
    }
    requests
}

/// `updateSheetProperties` requests placing sheets in lowercased-title order.
pub fn sort_requests(sheets: &[SheetProperties]) -> Vec<JsonValue> {
    let mut sorted: Vec<&SheetProperties> = sheets.iter().collect();
    sorted.sort_by_key(|s| s.title.to_lowercase());
    sorted
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            json!({
                "updateSheetProperties": {
                    "properties": { "sheetId": s.sheet_id, "index": idx },
                    "fields": "index"
                }
            })
        })
        .collect()
}
