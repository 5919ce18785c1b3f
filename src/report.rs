use crate::core::hvac_sizing::{GeothermalLoopSizing, SystemSizing};
use crate::core::loads::aggregation::BuildingLoads;
use crate::core::loads::{DesignLoad, LoadBreakdown};
use crate::core::units::{btu_per_hour_to_watts, HOURS_PER_YEAR};
use crate::input::{BoreConfiguration, HvacSystemType};
use crate::model::SizingResults;
use csv::WriterBuilder;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;

pub const TOTAL: &str = "Total";

/// One row of a design load report, in Btu/h
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DesignLoadRow {
    #[serde(rename = "Heating (Btuh)")]
    pub heating: f64,
    #[serde(rename = "Cooling Sensible (Btuh)")]
    pub cooling_sensible: f64,
    #[serde(rename = "Cooling Latent (Btuh)")]
    pub cooling_latent: f64,
}

impl From<DesignLoad> for DesignLoadRow {
    fn from(load: DesignLoad) -> Self {
        Self {
            heating: load.heating,
            cooling_sensible: load.cooling_sensible,
            cooling_latent: load.cooling_latent,
        }
    }
}

/// Rows of one report by component name, ending with the total
pub type DesignLoadTable = IndexMap<String, DesignLoadRow>;

/// Design load reports by report name: the whole building, then each zone,
/// then each space
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DesignLoadReport(pub IndexMap<String, DesignLoadTable>);

impl DesignLoadReport {
    pub fn from_loads(loads: &BuildingLoads) -> Self {
        let mut reports = IndexMap::from([(TOTAL.to_string(), table(&loads.breakdown()))]);
        for (zone_name, zone) in &loads.zones {
            reports.insert(format!("Zone: {zone_name}"), table(&zone.breakdown()));
        }
        for zone in loads.zones.values() {
            for (space_name, space) in &zone.spaces {
                reports.insert(format!("Space: {space_name}"), table(&space.breakdown));
            }
        }
        Self(reports)
    }
}

fn table(breakdown: &LoadBreakdown) -> DesignLoadTable {
    let mut rows = breakdown
        .iter()
        .map(|(component, load)| (component.to_string(), DesignLoadRow::from(load)))
        .collect::<DesignLoadTable>();
    rows.insert(TOTAL.to_string(), breakdown.total().into());
    rows
}

/// Capacities of one system, for reporting
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapacityRow {
    #[serde(rename = "System")]
    pub system: String,
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Type")]
    pub system_type: HvacSystemType,
    #[serde(rename = "Heating Capacity (Btuh)")]
    pub heating_btuh: f64,
    #[serde(rename = "Heating Capacity (W)")]
    pub heating_w: f64,
    #[serde(rename = "Cooling Capacity (Btuh)")]
    pub cooling_btuh: f64,
    #[serde(rename = "Cooling Capacity (W)")]
    pub cooling_w: f64,
    #[serde(rename = "Backup Capacity (Btuh)")]
    pub backup_btuh: f64,
    #[serde(rename = "Backup Capacity (W)")]
    pub backup_w: f64,
    #[serde(rename = "Heating Airflow (cfm)")]
    pub heating_airflow: f64,
    #[serde(rename = "Cooling Airflow (cfm)")]
    pub cooling_airflow: f64,
}

impl From<&SystemSizing> for CapacityRow {
    fn from(sizing: &SystemSizing) -> Self {
        Self {
            system: sizing.name.clone(),
            zone: sizing.zone.clone(),
            system_type: sizing.system_type,
            heating_btuh: sizing.heating_capacity(),
            heating_w: btu_per_hour_to_watts(sizing.heating_capacity()),
            cooling_btuh: sizing.cooling_capacity(),
            cooling_w: btu_per_hour_to_watts(sizing.cooling_capacity()),
            backup_btuh: sizing.backup_capacity(),
            backup_w: btu_per_hour_to_watts(sizing.backup_capacity()),
            heating_airflow: sizing.heating_airflow,
            cooling_airflow: sizing.cooling_airflow,
        }
    }
}

/// One tabulated point of a bore field g-function
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GFunctionPoint {
    pub ln_t_ts: f64,
    pub years: f64,
    pub g: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeothermalLoopReport {
    pub bore_configuration: BoreConfiguration,
    pub num_bore_holes: u32,
    /// in ft
    pub bore_depth: f64,
    /// in ft
    pub bore_spacing: f64,
    /// in gpm
    pub loop_flow: f64,
    /// in years
    pub time_scale: f64,
    pub g_functions: Vec<GFunctionPoint>,
}

impl From<&GeothermalLoopSizing> for GeothermalLoopReport {
    fn from(sizing: &GeothermalLoopSizing) -> Self {
        Self {
            bore_configuration: sizing.bore_configuration,
            num_bore_holes: sizing.num_bore_holes,
            bore_depth: sizing.bore_depth,
            bore_spacing: sizing.bore_spacing,
            loop_flow: sizing.loop_flow,
            time_scale: sizing.time_scale / HOURS_PER_YEAR,
            g_functions: sizing
                .g_function
                .pairs()
                .zip(sizing.g_function_in_years())
                .map(|((ln_t_ts, g), (years, _))| GFunctionPoint { ln_t_ts, years, g })
                .collect(),
        }
    }
}

/// All reported results, as written to JSON
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SizingReport {
    pub design_loads: DesignLoadReport,
    pub hvac_capacities: Vec<CapacityRow>,
    pub geothermal_loop: Option<GeothermalLoopReport>,
    pub warnings: Vec<String>,
}

impl From<&SizingResults> for SizingReport {
    fn from(results: &SizingResults) -> Self {
        Self {
            design_loads: DesignLoadReport::from_loads(&results.loads),
            hvac_capacities: results.systems.values().map(CapacityRow::from).collect(),
            geothermal_loop: results.geothermal_loop.as_ref().map(GeothermalLoopReport::from),
            warnings: results.warnings.clone(),
        }
    }
}

pub fn write_design_loads_csv(writer: impl Write, report: &DesignLoadReport) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record([
        "Report",
        "Component",
        "Heating (Btuh)",
        "Cooling Sensible (Btuh)",
        "Cooling Latent (Btuh)",
    ])?;
    for (report_name, rows) in &report.0 {
        for (component, row) in rows {
            writer.write_record([
                report_name.clone(),
                component.clone(),
                format!("{:.0}", row.heating),
                format!("{:.0}", row.cooling_sensible),
                format!("{:.0}", row.cooling_latent),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_capacities_csv(writer: impl Write, rows: &[CapacityRow]) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_geothermal_loop_csv(writer: impl Write, report: &GeothermalLoopReport) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
    writer.write_record(["Bore Configuration", &report.bore_configuration.to_string()])?;
    writer.write_record(["Number of Bore Holes", &report.num_bore_holes.to_string()])?;
    writer.write_record(["Bore Depth (ft)", &format!("{:.1}", report.bore_depth)])?;
    writer.write_record(["Bore Spacing (ft)", &format!("{:.1}", report.bore_spacing)])?;
    writer.write_record(["Loop Flow (gpm)", &format!("{:.2}", report.loop_flow)])?;
    writer.write_record(["Time Scale (years)", &format!("{:.2}", report.time_scale)])?;
    writer.write_record(["ln(t/ts)", "Time (years)", "g"])?;
    for point in &report.g_functions {
        writer.write_record([
            point.ln_t_ts.to_string(),
            format!("{:.4}", point.years),
            format!("{:.4}", point.g),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json(writer: impl Write, report: &SizingReport) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loads::aggregation::{SpaceLoads, ZoneLoads};
    use crate::core::loads::LoadComponent;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn loads() -> BuildingLoads {
        let space = |walls: DesignLoad, infiltration: DesignLoad| {
            let mut breakdown = LoadBreakdown::default();
            breakdown.add(LoadComponent::Walls, walls);
            breakdown.add(LoadComponent::Infiltration, infiltration);
            SpaceLoads {
                floor_area: 500.,
                volume: 4000.,
                breakdown,
                fenestration_curve: [0.; 12],
            }
        };
        BuildingLoads {
            zones: IndexMap::from([(
                "main".to_string(),
                ZoneLoads {
                    spaces: IndexMap::from([
                        (
                            "living".to_string(),
                            space(DesignLoad::new(1200.4, 300.2, 0.), DesignLoad::new(800., 200., 150.)),
                        ),
                        (
                            "kitchen".to_string(),
                            space(DesignLoad::new(600.3, 150.1, 0.), DesignLoad::new(400., 100., 75.)),
                        ),
                    ]),
                    ..Default::default()
                },
            )]),
        }
    }

    #[rstest]
    fn should_name_reports_for_building_zones_and_spaces(loads: BuildingLoads) {
        let report = DesignLoadReport::from_loads(&loads);
        assert_eq!(
            report.0.keys().cloned().collect::<Vec<_>>(),
            vec!["Total", "Zone: main", "Space: living", "Space: kitchen"]
        );
    }

    #[rstest]
    fn should_make_total_row_the_sum_of_other_rows(loads: BuildingLoads) {
        let report = DesignLoadReport::from_loads(&loads);
        for rows in report.0.values() {
            let total = rows[TOTAL];
            let (heating, sensible, latent) = rows
                .iter()
                .filter(|(component, _)| component.as_str() != TOTAL)
                .fold((0., 0., 0.), |(h, s, l), (_, row)| {
                    (h + row.heating, s + row.cooling_sensible, l + row.cooling_latent)
                });
            assert_relative_eq!(total.heating, heating, max_relative = 1e-12);
            assert_relative_eq!(total.cooling_sensible, sensible, max_relative = 1e-12);
            assert_relative_eq!(total.cooling_latent, latent, max_relative = 1e-12);
        }
    }

    #[rstest]
    fn should_write_design_loads_csv(loads: BuildingLoads) {
        let mut buffer = vec![];
        write_design_loads_csv(&mut buffer, &DesignLoadReport::from_loads(&loads)).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Report,Component,Heating (Btuh),Cooling Sensible (Btuh),Cooling Latent (Btuh)")
        );
        assert!(csv.contains("Total,Walls,1801,450,0"));
        assert!(csv.contains("Space: kitchen,Total,1000,250,75"));
    }

    #[rstest]
    fn should_write_g_function_against_time() {
        let report = GeothermalLoopReport {
            bore_configuration: BoreConfiguration::Rectangle,
            num_bore_holes: 3,
            bore_depth: 189.,
            bore_spacing: 16.4,
            loop_flow: 9.,
            time_scale: 21.8,
            g_functions: vec![GFunctionPoint {
                ln_t_ts: 0.,
                years: 21.8,
                g: 11.81,
            }],
        };
        let mut buffer = vec![];
        write_geothermal_loop_csv(&mut buffer, &report).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        assert!(csv.contains("Time Scale (years),21.80"));
        assert!(csv.contains("ln(t/ts),Time (years),g\n0,21.8000,11.8100"));
    }

    #[rstest]
    fn should_write_json_with_column_names(loads: BuildingLoads) {
        let report = SizingReport {
            design_loads: DesignLoadReport::from_loads(&loads),
            hvac_capacities: vec![],
            geothermal_loop: None,
            warnings: vec![],
        };
        let mut buffer = vec![];
        write_json(&mut buffer, &report).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(
            json["DesignLoads"]["Zone: main"]["Infiltration"]["Cooling Latent (Btuh)"],
            serde_json::json!(225.)
        );
        assert!(json["GeothermalLoop"].is_null());
    }
}
