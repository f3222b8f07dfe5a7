use iocontroller_driver::common::logger::init_logger;
use iocontroller_driver::common::setting::Settings;
use iocontroller_driver::driver::iocontroller::prelude::MAX_BLOCK;
use iocontroller_driver::IoController;
use iocontroller_driver::{info, error};
use std::error::Error;
use dotenv::dotenv;

const LOG_TAG: &str = "main";

fn main() -> Result<(), Box<dyn Error>> {
    // .env may carry ENV and mode
    dotenv().ok();

    let settings = Settings::get();

    init_logger()?;
    info!(LOG_TAG, "settings loaded, env: {:?}", settings.env.env);
    log::debug!("settings: {:?}", settings);

    let mut io = IoController::from_settings(settings)?;
    info!(LOG_TAG, "{}", io);
    io.open_transport()?;

    let result = report_inputs(&mut io);
    if let Err(e) = &result {
        error!(LOG_TAG, "controller exchange failed: {}", e);
    }
    io.close_transport()?;
    result?;
    Ok(())
}

/// reset the controller and log every digital input block
fn report_inputs(io: &mut IoController) -> Result<(), Box<dyn Error>> {
    io.reset_controller()?;
    for block in 0..=MAX_BLOCK {
        let value = io.get_byte_digital_input_block(block)?;
        info!(LOG_TAG, "digital input block {}: {:#010b}", block, value);
    }
    Ok(())
}
