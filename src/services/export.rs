use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

pub const COLUMNS: [&str; 17] = [
    "id",
    "tmdb_id",
    "title",
    "original_title",
    "overview",
    "release_date",
    "genre",
    "poster_path",
    "language",
    "runtime",
    "vote_average",
    "main_cast",
    "reference_city",
    "latitude",
    "longitude",
    "created_at",
    "updated_at",
];

const SHEET_NAME: &str = "Movies";

/// Export format offered for download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// `movie_catalog_YYYYMMDD_HHMMSS.<ext>`
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!(
            "movie_catalog_{}.{}",
            at.format("%Y%m%d_%H%M%S"),
            self.extension()
        )
    }
}

/// A single exported value; `Empty` renders as a blank cell
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Empty,
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Text(v.to_string()))
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Integer(value) => value.to_string(),
            Cell::Decimal(value) => value.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn row(movie: &Movie) -> [Cell; 17] {
    [
        Cell::Integer(movie.id),
        Cell::Integer(movie.tmdb_id),
        Cell::Text(movie.title.clone()),
        Cell::Text(movie.original_title.clone()),
        Cell::text(movie.overview.as_deref()),
        movie
            .release_date
            .map_or(Cell::Empty, |d| Cell::Text(d.format("%Y-%m-%d").to_string())),
        Cell::text(movie.genre.as_deref()),
        Cell::text(movie.poster_path.as_deref()),
        Cell::text(movie.language.as_deref()),
        movie.runtime.map_or(Cell::Empty, Cell::Integer),
        movie.vote_average.map_or(Cell::Empty, Cell::Decimal),
        Cell::text(movie.main_cast.as_deref()),
        Cell::text(movie.reference_city.as_deref()),
        movie.latitude.map_or(Cell::Empty, Cell::Decimal),
        movie.longitude.map_or(Cell::Empty, Cell::Decimal),
        Cell::Text(timestamp(&movie.created_at)),
        Cell::Text(timestamp(&movie.updated_at)),
    ]
}

pub fn export(movies: &[Movie], format: ExportFormat) -> AppResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => export_csv(movies),
        ExportFormat::Xlsx => export_xlsx(movies),
    }
}

pub fn export_csv(movies: &[Movie]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_csv(&mut writer, movies).map_err(|e| export_error("CSV", e))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| export_error("CSV", e.into_error()))?;

    tracing::info!(movies = movies.len(), bytes = bytes.len(), "CSV export completed");
    Ok(bytes)
}

fn write_csv(writer: &mut csv::Writer<Vec<u8>>, movies: &[Movie]) -> Result<(), csv::Error> {
    writer.write_record(COLUMNS)?;
    for movie in movies {
        writer.write_record(row(movie).iter().map(Cell::render))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_xlsx(movies: &[Movie]) -> AppResult<Vec<u8>> {
    let bytes = build_workbook(movies).map_err(|e| export_error("Excel", e))?;

    tracing::info!(movies = movies.len(), bytes = bytes.len(), "Excel export completed");
    Ok(bytes)
}

fn build_workbook(movies: &[Movie]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, movie) in movies.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, cell) in row(movie).iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(r, col, value)?;
                }
                Cell::Integer(value) => {
                    worksheet.write_number(r, col, *value as f64)?;
                }
                Cell::Decimal(value) => {
                    worksheet.write_number(r, col, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }

    worksheet.autofit();
    workbook.save_to_buffer()
}

fn export_error(kind: &str, error: impl std::fmt::Display) -> AppError {
    tracing::error!(error = %error, "{} export failed", kind);
    AppError::Export(format!("{} export failed: {}", kind, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::fixtures::movie;
    use chrono::{NaiveDate, TimeZone};

    fn sample() -> Vec<Movie> {
        let mut amelie = movie(1, "Amélie");
        amelie.release_date = NaiveDate::from_ymd_opt(2001, 4, 25);
        amelie.overview = Some("Paris, \"Montmartre\", 1997".to_string());
        amelie.runtime = Some(122);
        amelie.vote_average = Some(7.9);
        amelie.reference_city = Some("Paris".to_string());
        amelie.latitude = Some(48.8566);
        amelie.longitude = Some(2.3522);
        amelie.created_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        amelie.updated_at = amelie.created_at;

        vec![amelie, movie(2, "Metropolis")]
    }

    #[test]
    fn test_file_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 14, 5, 9).unwrap();
        assert_eq!(
            ExportFormat::Csv.file_name(at),
            "movie_catalog_20261016_140509.csv"
        );
        assert_eq!(
            ExportFormat::Xlsx.file_name(at),
            "movie_catalog_20261016_140509.xlsx"
        );
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let bytes = export_csv(&sample()).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 17);
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[16], "updated_at");

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);

        let amelie = &records[0];
        assert_eq!(&amelie[2], "Amélie");
        assert_eq!(&amelie[4], "Paris, \"Montmartre\", 1997");
        assert_eq!(&amelie[5], "2001-04-25");
        assert_eq!(&amelie[9], "122");
        assert_eq!(&amelie[10], "7.9");
        assert_eq!(&amelie[13], "48.8566");
        assert_eq!(&amelie[15], "2026-10-16 09:30:00");

        let metropolis = &records[1];
        assert_eq!(&metropolis[5], "");
        assert_eq!(&metropolis[13], "");
    }

    #[test]
    fn test_csv_empty_catalog_has_header_only() {
        let bytes = export_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,tmdb_id,title"));
    }

    #[test]
    fn test_xlsx_produces_zip_archive() {
        let bytes = export(&sample(), ExportFormat::Xlsx).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }
}
