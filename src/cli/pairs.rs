use super::ui;
use crate::quotation::QuoteService;
use anyhow::Result;
use comfy_table::Cell;

/// Lists registered pairs with their latest stored quote.
pub async fn run(service: &QuoteService) -> Result<()> {
    let pairs = service.registered_pairs().await?;
    if pairs.is_empty() {
        println!(
            "{}",
            ui::style_text("No registered pairs yet", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(ui::quote_header());
    for pair in pairs {
        match service.latest_quote(&pair).await {
            Ok(Some(quote)) => {
                table.add_row(ui::quote_row(&quote));
            }
            Ok(None) => {
                table.add_row(vec![
                    Cell::new(pair.to_string()),
                    ui::format_optional_cell(None::<String>, |r| r),
                    ui::format_optional_cell(None::<String>, |t| t),
                    ui::format_optional_cell(None::<String>, |i| i),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(pair.to_string()),
                    ui::error_cell(&e.to_string()),
                ]);
            }
        }
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Registered pairs", ui::StyleType::Title),
        table
    );
    Ok(())
}
