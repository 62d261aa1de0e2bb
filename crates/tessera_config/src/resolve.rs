//! Board resolution: turning the `[board]` table into a topology.

use crate::error::ConfigError;
use crate::types::{BoardConfig, DEFAULT_BOARD};
use tessera_arch::{
    load_board, parse_columns, BoardSpec, BoardTopology, ForbiddenRegion, TopologyError,
};

/// Resolves the configured board: a custom column map when given, otherwise
/// the named catalogue board, otherwise the default.
pub fn resolve_board(config: &BoardConfig) -> Result<BoardTopology, ConfigError> {
    if let Some(custom) = &config.custom {
        let spec = BoardSpec {
            name: custom.name.clone(),
            device: custom.device.clone(),
            columns: parse_columns(&custom.columns)?,
            clock_rows: custom.clock_rows,
            rows_per_clock_region: custom.rows_per_clock_region,
            granularity: custom.granularity,
            forbidden: custom
                .forbidden
                .iter()
                .copied()
                .map(ForbiddenRegion::new)
                .collect(),
            reconfig_time_per_unit: custom.reconfig_time_per_unit,
        };
        return Ok(BoardTopology::new(spec)?);
    }

    let name = config.name.as_deref().unwrap_or(DEFAULT_BOARD);
    load_board(name).map_err(|e| match e {
        TopologyError::UnknownBoard { name, .. } => ConfigError::UnknownBoard(name),
        other => ConfigError::Topology(other),
    })
}
