use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, load_inputs, table::Table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let dataset = load_inputs(&args.input)?;
    let mut table = Table::new(dataset.column_names());
    for (idx, column) in dataset.columns().iter().enumerate() {
        if column.datatype.is_numeric() {
            table = table.align_right(idx);
        }
    }

    let shown = args.rows.min(dataset.row_count());
    for idx in 0..shown {
        table.push_row(dataset.row(idx).into_iter().map(|cell| cell.unwrap_or("")));
    }

    table.print();
    info!(
        "Displayed {} of {} row(s) across {} column(s)",
        shown,
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(())
}
