pub mod add_member;
pub mod edit;
pub mod shifts;
pub mod show;

use crate::output::{CliError, OutputMode, render_error};
use rota_core::http::Transport;
use rota_core::{ScheduleId, ScheduleStore, StoreError};

/// Load a schedule into the store, rendering the failure if there is one.
pub fn load_schedule<T: Transport>(
    store: &mut ScheduleStore<T>,
    schedule: ScheduleId,
    output: OutputMode,
) -> anyhow::Result<()> {
    if let Err(err) = store.get_schedule(schedule) {
        render_error(output, &CliError::from(&err))?;
        return Err(err.into());
    }
    Ok(())
}

/// Render a store error before handing it to `main`.
pub fn report<T>(result: Result<T, StoreError>, output: OutputMode) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}
