use super::{TileContext, TileHandler};
use crate::common::markdown::generate_markdown_table;
use crate::error::HandlerError;
use crate::model::TileKind;

struct Simulation {
    key: &'static str,
    properties: &'static [(&'static str, &'static str)],
}

const SIMULATIONS: &[Simulation] = &[
    Simulation {
        key: "brainwaves-grabber",
        properties: &[
            ("Name", "Brainwaves Grabber"),
            (
                "Description",
                "A robotic arm whose gripper closes in response to a muscle (EMG) signal.",
            ),
            ("Inputs", "EMG signal, gripper command"),
            ("Outputs", "Gripper position, pressure reading"),
        ],
    },
    Simulation {
        key: "potentiometer-servo",
        properties: &[
            ("Name", "Potentiometer and Servo"),
            (
                "Description",
                "A potentiometer dial whose position drives the angle of a servo motor arm.",
            ),
            ("Inputs", "Servo angle command"),
            ("Outputs", "Potentiometer position, servo angle"),
        ],
    },
    Simulation {
        key: "terrarium",
        properties: &[
            ("Name", "Terrarium"),
            (
                "Description",
                "A closed terrarium with a heat lamp and a fan, tracking the air inside.",
            ),
            ("Inputs", "Heat lamp, fan"),
            ("Outputs", "Temperature, humidity"),
        ],
    },
];

/// Simulator tiles, described from a fixed table of known simulations.
pub struct SimulatorHandler;

impl TileHandler for SimulatorHandler {
    fn name(&self) -> &str {
        "simulator"
    }

    fn description(&self) -> &str {
        "known simulations as a property table"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Simulator {
            return Ok(None);
        }

        let key = ctx.tile.content_str("simulation").unwrap_or_default();
        let Some(simulation) = SIMULATIONS.iter().find(|sim| sim.key == key) else {
            return Ok(Some(format!(
                "This tile contains a simulation. No information is available about the \"{key}\" simulation."
            )));
        };

        let rows: Vec<Vec<String>> = simulation
            .properties
            .iter()
            .map(|(name, value)| vec![name.to_string(), value.to_string()])
            .collect();
        Ok(Some(format!(
            "This tile contains the \"{key}\" simulation, described in the following Markdown table.\n\n{}",
            generate_markdown_table(&["Property", "Value"], &rows)
        )))
    }
}
