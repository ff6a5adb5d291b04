//! Schema command - print the rate document and chart export formats

use crate::cmd::curve::ChartRecord;
use crate::core::RateDocument;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema of the rate document
    JsonSchema,
    /// CSV header row of the chart export
    CsvHeader,
    /// CSV column descriptions of the chart export
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(RateDocument);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        let names: Vec<_> = ChartRecord::csv_columns().iter().map(|c| c.name).collect();
        println!("{}", names.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("Chart CSV Format");
        println!("================");
        println!();
        for column in ChartRecord::csv_columns() {
            let req = if column.required { "required" } else { "optional" };
            println!("{:10} ({:8})  {}", column.name, req, column.description);
        }
        println!();
        println!("One row per income sample; incomes are whole euros");
        Ok(())
    }
}
