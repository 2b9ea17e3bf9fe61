//! # Integration Tests
//!
//! Cross-crate tests:
//! - configuration contract snapshots
//! - aperture correction feeding catalog calculation
//! - document-to-document runs through the loaders

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ConfigVersion, DEFAULT_CATALOG_CALCULATION_PLUGINS};

    const DOCUMENTED_CONFIG: &str = r#"
version = "V1"
ap_corr_names = ["base_PsfFlux", "base_GaussianFlux"]

[apply_ap_corr]
ignore_list = []
do_flag_ap_corr_failures = true
[apply_ap_corr.proxies]
ext_CModel = "base_GaussianFlux"

[catalog_calculation]
[[catalog_calculation.plugins]]
name = "base_ClassificationExtendedness"
[catalog_calculation.plugins.config]
flux_ratio = 0.95
"#;

    #[test]
    fn test_documented_config_parses() {
        let bp = ConfigLoader::load_from_str(DOCUMENTED_CONFIG, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.version, ConfigVersion::V1);
        assert_eq!(bp.apply_ap_corr.proxies["ext_CModel"], "base_GaussianFlux");
        assert_eq!(bp.catalog_calculation.plugins.len(), 1);
        assert_eq!(bp.catalog_calculation.plugins[0].config["flux_ratio"], 0.95);
    }

    #[test]
    fn test_default_plugin_set() {
        let bp = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        let names: Vec<&str> = bp
            .catalog_calculation
            .plugins
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, DEFAULT_CATALOG_CALCULATION_PLUGINS);
    }

    #[test]
    fn test_default_plugins_are_registered() {
        let registry = catalog_calculation::PluginRegistry::with_builtin_plugins().unwrap();
        let selections = registry
            .make_field(&DEFAULT_CATALOG_CALCULATION_PLUGINS)
            .unwrap();
        assert_eq!(selections.len(), DEFAULT_CATALOG_CALCULATION_PLUGINS.len());
    }
}

/// Fixtures shared by the end-to-end tests
#[cfg(test)]
mod fixtures {
    use std::sync::Arc;

    use catalog_calculation::PluginDefinition;
    use contracts::{
        ApCorrMap, Box2D, CatalogCalculationPlugin, CatalogPlugin, ConstantField, ContractError,
        Key, MeasurementError, PluginError, Point2D, Schema, SourceCatalog,
    };
    use serde::{Deserialize, Serialize};

    pub const FLUX_PREFIXES: [&str; 2] = ["base_PsfFlux", "base_GaussianFlux"];

    /// Schema with the flux columns the built-in plugins read
    pub fn flux_schema() -> Schema {
        let mut schema = Schema::new();
        for prefix in FLUX_PREFIXES {
            schema
                .add_field::<f64>(Schema::join(prefix, "instFlux"), "")
                .unwrap();
            schema
                .add_field::<f64>(Schema::join(prefix, "instFluxErr"), "")
                .unwrap();
            schema
                .add_field::<bool>(Schema::join(prefix, "flag"), "")
                .unwrap();
        }
        schema
    }

    pub struct Source {
        pub id: u64,
        pub parent: Option<u64>,
        pub centroid: (f64, f64),
        pub psf: f64,
        pub model: f64,
        pub footprint_area: Option<u32>,
    }

    pub fn fill(catalog: &mut SourceCatalog, sources: &[Source]) {
        let schema = catalog.schema().clone();
        let psf = schema.find::<f64>("base_PsfFlux_instFlux").unwrap();
        let psf_err = schema.find::<f64>("base_PsfFlux_instFluxErr").unwrap();
        let model = schema.find::<f64>("base_GaussianFlux_instFlux").unwrap();
        let model_err = schema.find::<f64>("base_GaussianFlux_instFluxErr").unwrap();

        for source in sources {
            let record = catalog.add_new(
                source.id,
                Point2D::new(source.centroid.0, source.centroid.1),
            );
            record.set_parent(source.parent);
            record.set_footprint_area(source.footprint_area);
            record.set(psf, source.psf);
            record.set(psf_err, source.psf / 20.0);
            record.set(model, source.model);
            record.set(model_err, source.model / 20.0);
        }
    }

    /// A parent with one extended and one point-like child; the point-like
    /// child has no footprint
    pub fn family() -> Vec<Source> {
        vec![
            Source {
                id: 1,
                parent: None,
                centroid: (50.0, 50.0),
                psf: 200.0,
                model: 300.0,
                footprint_area: Some(120),
            },
            Source {
                id: 2,
                parent: Some(1),
                centroid: (45.0, 48.0),
                psf: 100.0,
                model: 130.0,
                footprint_area: Some(40),
            },
            Source {
                id: 3,
                parent: Some(1),
                centroid: (55.0, 52.0),
                psf: 100.0,
                model: 100.0,
                footprint_area: None,
            },
        ]
    }

    pub fn constant_map(entries: &[(&str, f64)]) -> ApCorrMap {
        let bbox = Box2D::new(0.0, 0.0, 99.0, 99.0);
        let mut map = ApCorrMap::new();
        for (name, value) in entries {
            map.insert(*name, Arc::new(ConstantField::new(bbox, *value)));
        }
        map
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct ExtendedChildrenConfig {
        /// Minimum extendedness value counted as extended
        pub threshold: f64,
    }

    /// Counts each parent's extended children; reads the output of
    /// `base_ClassificationExtendedness`, so it must run in a later bucket
    pub struct ExtendedChildren {
        name: String,
        threshold: f64,
        extendedness: Key<f64>,
        value: Key<i32>,
    }

    impl PluginDefinition for ExtendedChildren {
        type Config = ExtendedChildrenConfig;
        const EXECUTION_ORDER: f64 = 5.0;

        fn build(
            config: ExtendedChildrenConfig,
            name: &str,
            schema: &mut Schema,
        ) -> Result<CatalogCalculationPlugin, ContractError> {
            let extendedness = schema.find("base_ClassificationExtendedness_value")?;
            let value = schema.add_field::<i32>(
                Schema::join(name, "value"),
                "number of extended children",
            )?;
            Ok(CatalogCalculationPlugin::multi(Self {
                name: name.to_string(),
                threshold: if config.threshold > 0.0 {
                    config.threshold
                } else {
                    1.0
                },
                extendedness,
                value,
            }))
        }
    }

    impl CatalogPlugin for ExtendedChildren {
        fn name(&self) -> &str {
            &self.name
        }

        fn calculate(&mut self, catalog: &mut SourceCatalog) -> Result<(), PluginError> {
            let counts: Vec<i32> = catalog
                .iter()
                .map(|record| {
                    catalog
                        .children(record.id())
                        .filter(|child| child.get(self.extendedness) >= self.threshold)
                        .count() as i32
                })
                .collect();
            for (record, count) in catalog.iter_mut().zip(counts) {
                record.set(self.value, count);
            }
            Ok(())
        }

        fn fail(&mut self, _catalog: &mut SourceCatalog, _error: Option<&MeasurementError>) {}
    }

    /// Declares an order below the catalog calculation minimum
    pub struct TooEarly;

    impl PluginDefinition for TooEarly {
        type Config = ExtendedChildrenConfig;
        const EXECUTION_ORDER: f64 = contracts::APCORR_ORDER;

        fn build(
            config: ExtendedChildrenConfig,
            name: &str,
            schema: &mut Schema,
        ) -> Result<CatalogCalculationPlugin, ContractError> {
            <ExtendedChildren as PluginDefinition>::build(config, name, schema)
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use ap_corr::{ApCorrNameSet, ApplyApCorrTask};
    use catalog_calculation::{CatalogCalculationError, CatalogCalculationTask, PluginRegistry};
    use contracts::{
        ApplyApCorrConfig, CatalogCalculationConfig, PluginSelection, Schema, SourceCatalog,
    };
    use observability::MeasurementMetricsAggregator;

    use crate::fixtures::{self, ExtendedChildren, TooEarly};

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::with_builtin_plugins().unwrap();
        registry
            .register::<ExtendedChildren>("test_ExtendedChildren")
            .unwrap();
        registry.register::<TooEarly>("test_TooEarly").unwrap();
        registry
    }

    fn selection(names: &[&str]) -> CatalogCalculationConfig {
        CatalogCalculationConfig {
            plugins: names.iter().map(|n| PluginSelection::new(*n)).collect(),
        }
    }

    #[test]
    fn test_later_bucket_sees_earlier_outputs() {
        let mut schema = fixtures::flux_schema();
        // Selected first, constructed and run after the order 4.0 plugins
        let config = selection(&[
            "test_ExtendedChildren",
            "base_ClassificationExtendedness",
            "base_FootprintArea",
        ]);
        let mut task = CatalogCalculationTask::new(&mut schema, &registry(), &config).unwrap();
        assert_eq!(task.execution_orders(), [4.0, 5.0]);

        let mut catalog = SourceCatalog::new(schema);
        fixtures::fill(&mut catalog, &fixtures::family());
        let summary = task.run(&mut catalog).unwrap();

        // 2 record plugins x 3 records + 1 catalog plugin
        assert_eq!(summary.invocations, 7);
        assert_eq!(summary.buckets, 2);
        // record 3 has no footprint
        assert_eq!(summary.measurement_failures, 1);
        assert_eq!(summary.plugins["base_FootprintArea"].measurement_failures, 1);

        let schema = catalog.schema();
        let extended = schema.find::<f64>("base_ClassificationExtendedness_value").unwrap();
        let children = schema.find::<i32>("test_ExtendedChildren_value").unwrap();
        let area = schema.find::<i32>("base_FootprintArea_value").unwrap();

        let values: Vec<(f64, i32, i32)> = catalog
            .iter()
            .map(|r| (r.get(extended), r.get(children), r.get(area)))
            .collect();
        assert_eq!(values[0], (1.0, 1, 120));
        assert_eq!(values[1], (1.0, 0, 40));
        assert_eq!(values[2].0, 0.0);
        assert_eq!(values[2].1, 0);
    }

    #[test]
    fn test_low_order_plugin_rejected_before_construction() {
        let mut schema = fixtures::flux_schema();
        let before = schema.len();
        let config = selection(&["base_ClassificationExtendedness", "test_TooEarly"]);

        let err = CatalogCalculationTask::new(&mut schema, &registry(), &config).unwrap_err();

        assert!(matches!(
            err,
            CatalogCalculationError::ExecutionOrderTooLow { ref plugin, .. } if plugin == "test_TooEarly"
        ));
        assert_eq!(schema.len(), before);
    }

    #[test]
    fn test_registries_are_independent() {
        let plain = PluginRegistry::with_builtin_plugins().unwrap();
        let extended = registry();

        assert!(!plain.contains("test_ExtendedChildren"));
        assert!(extended.contains("test_ExtendedChildren"));

        let mut schema = fixtures::flux_schema();
        let err = CatalogCalculationTask::new(
            &mut schema,
            &plain,
            &selection(&["test_ExtendedChildren"]),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogCalculationError::UnknownPlugin { .. }));
    }

    #[test]
    fn test_ap_corr_then_classification() {
        let mut schema = fixtures::flux_schema();
        let names = ApCorrNameSet::from_names(fixtures::FLUX_PREFIXES);
        let ap_corr = ApplyApCorrTask::new(&mut schema, &names, ApplyApCorrConfig::default())
            .unwrap();
        let mut calculation = CatalogCalculationTask::new(
            &mut schema,
            &registry(),
            &selection(&["base_ClassificationExtendedness"]),
        )
        .unwrap();

        let mut catalog = SourceCatalog::new(schema);
        fixtures::fill(&mut catalog, &fixtures::family());

        // Child 3 is point-like before correction (92.5 < 100) and extended
        // once the model flux is scaled by 1.2 (111 >= 100)
        let map = fixtures::constant_map(&[
            ("base_PsfFlux_instFlux", 1.0),
            ("base_PsfFlux_instFluxErr", 0.0),
            ("base_GaussianFlux_instFlux", 1.2),
            ("base_GaussianFlux_instFluxErr", 0.0),
        ]);
        let fields = ap_corr.run(&mut catalog, &map);
        assert!(fields.iter().all(|f| f.corrected == 3 && f.failed == 0));

        calculation.run(&mut catalog).unwrap();

        let extended = catalog
            .schema()
            .find::<f64>("base_ClassificationExtendedness_value")
            .unwrap();
        assert!(catalog.iter().all(|r| r.get(extended) == 1.0));
    }

    #[test]
    fn test_domain_error_flags_flux_for_later_plugins() {
        let mut schema = fixtures::flux_schema();
        let names = ApCorrNameSet::from_names(["base_PsfFlux"]);
        let ap_corr = ApplyApCorrTask::new(&mut schema, &names, ApplyApCorrConfig::default())
            .unwrap();
        let mut calculation = CatalogCalculationTask::new(
            &mut schema,
            &registry(),
            &selection(&["base_ClassificationExtendedness"]),
        )
        .unwrap();

        let mut sources = fixtures::family();
        // Outside the map's bounding box
        sources[1].centroid = (150.0, 150.0);
        let mut catalog = SourceCatalog::new(schema);
        fixtures::fill(&mut catalog, &sources);

        let map = fixtures::constant_map(&[
            ("base_PsfFlux_instFlux", 1.1),
            ("base_PsfFlux_instFluxErr", 0.0),
        ]);
        let fields = ap_corr.run(&mut catalog, &map);
        assert_eq!((fields[0].corrected, fields[0].failed), (2, 1));

        let summary = calculation.run(&mut catalog).unwrap();
        assert_eq!(summary.measurement_failures, 1);

        let schema = catalog.schema();
        let psf = schema.find::<f64>("base_PsfFlux_instFlux").unwrap();
        let psf_flag = schema.find::<bool>("base_PsfFlux_flag").unwrap();
        let ap_corr_flag = schema.find::<bool>("base_PsfFlux_flag_apCorr").unwrap();
        let ext_flag = schema
            .find::<bool>("base_ClassificationExtendedness_flag")
            .unwrap();

        let failed = catalog.find_by_id(2).unwrap();
        assert_eq!(failed.get(psf), 100.0);
        assert!(failed.get(psf_flag));
        assert!(failed.get(ap_corr_flag));
        assert!(failed.get(ext_flag));

        let ok = catalog.find_by_id(3).unwrap();
        assert!((ok.get(psf) - 110.0).abs() < 1e-9);
        assert!(!ok.get(psf_flag));
        assert!(!ok.get(ext_flag));
    }

    #[test]
    fn test_proxy_shares_correction_columns() {
        let mut schema = fixtures::flux_schema();
        for suffix in ["instFlux", "instFluxErr"] {
            schema
                .add_field::<f64>(Schema::join("ext_CModel", suffix), "")
                .unwrap();
        }
        schema.add_field::<bool>("ext_CModel_flag", "").unwrap();

        let names = ApCorrNameSet::from_names(fixtures::FLUX_PREFIXES);
        let config = ApplyApCorrConfig {
            proxies: [("ext_CModel".to_string(), "base_GaussianFlux".to_string())].into(),
            ..Default::default()
        };
        let task = ApplyApCorrTask::new(&mut schema, &names, config).unwrap();
        let order: Vec<&str> = task.infos().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(order, ["base_GaussianFlux", "base_PsfFlux", "ext_CModel"]);

        let mut catalog = SourceCatalog::new(schema);
        fixtures::fill(&mut catalog, &fixtures::family());
        let cmodel = catalog.schema().find::<f64>("ext_CModel_instFlux").unwrap();
        for record in catalog.iter_mut() {
            record.set(cmodel, 50.0);
        }

        let map = fixtures::constant_map(&[
            ("base_PsfFlux_instFlux", 1.1),
            ("base_PsfFlux_instFluxErr", 0.0),
            ("base_GaussianFlux_instFlux", 1.3),
            ("base_GaussianFlux_instFluxErr", 0.0),
        ]);
        task.run(&mut catalog, &map);

        let schema = catalog.schema();
        let proxy_ap_corr = schema.find::<f64>("ext_CModel_apCorr").unwrap();
        let model_ap_corr = schema.find::<f64>("base_GaussianFlux_apCorr").unwrap();
        assert_eq!(proxy_ap_corr, model_ap_corr);
        assert_ne!(
            schema.find::<bool>("ext_CModel_flag_apCorr").unwrap(),
            schema.find::<bool>("base_GaussianFlux_flag_apCorr").unwrap()
        );
        for record in &catalog {
            assert!((record.get(cmodel) - 65.0).abs() < 1e-9);
            assert_eq!(record.get(proxy_ap_corr), 1.3);
        }
    }

    #[test]
    fn test_metrics_aggregate_both_stages() {
        let mut schema = fixtures::flux_schema();
        let names = ApCorrNameSet::from_names(fixtures::FLUX_PREFIXES);
        let ap_corr = ApplyApCorrTask::new(&mut schema, &names, ApplyApCorrConfig::default())
            .unwrap();
        let mut calculation = CatalogCalculationTask::new(
            &mut schema,
            &registry(),
            &CatalogCalculationConfig::default(),
        )
        .unwrap();

        let mut catalog = SourceCatalog::new(schema);
        fixtures::fill(&mut catalog, &fixtures::family());
        // No model for base_GaussianFlux
        let map = fixtures::constant_map(&[
            ("base_PsfFlux_instFlux", 1.1),
            ("base_PsfFlux_instFluxErr", 0.0),
        ]);

        let mut aggregator = MeasurementMetricsAggregator::new();
        for field in ap_corr.run(&mut catalog, &map) {
            aggregator.absorb_ap_corr(&field.name, field.corrected, field.failed, &field.applied);
        }
        let summary = calculation.run(&mut catalog).unwrap();
        for (plugin, counts) in &summary.plugins {
            aggregator.absorb_plugin(plugin, counts);
        }

        let metrics = aggregator.summary();
        assert_eq!(metrics.total_invocations, 6);
        assert_eq!(metrics.total_failures, 1);
        let (corrected, failed, stats) = &metrics.ap_corr["base_PsfFlux"];
        assert_eq!((*corrected, *failed), (3, 0));
        assert!((stats.mean - 1.1).abs() < 1e-12);
        assert_eq!(metrics.ap_corr["base_GaussianFlux"].1, 3);
        assert!(metrics.to_string().contains("Plugin invocations: 6"));
    }
}

#[cfg(test)]
mod document_tests {
    use std::io::Write;

    use ap_corr::{ApCorrNameSet, ApplyApCorrTask};
    use catalog_calculation::{CatalogCalculationTask, PluginRegistry};
    use config_loader::{ApCorrMapLoader, CatalogLoader, ConfigFormat, ConfigLoader};
    use contracts::{CatalogDocument, FieldValue, SourceCatalog};

    const CONFIG: &str = r#"
ap_corr_names = ["base_PsfFlux", "base_GaussianFlux"]

[apply_ap_corr.proxies]
ext_CModel = "base_GaussianFlux"
"#;

    const CATALOG: &str = r#"{
  "fields": [
    {"name": "base_PsfFlux_instFlux", "kind": "f64"},
    {"name": "base_PsfFlux_instFluxErr", "kind": "f64"},
    {"name": "base_PsfFlux_flag", "kind": "flag"},
    {"name": "base_GaussianFlux_instFlux", "kind": "f64"},
    {"name": "base_GaussianFlux_instFluxErr", "kind": "f64"},
    {"name": "base_GaussianFlux_flag", "kind": "flag"},
    {"name": "ext_CModel_instFlux", "kind": "f64"},
    {"name": "ext_CModel_instFluxErr", "kind": "f64"},
    {"name": "ext_CModel_flag", "kind": "flag"}
  ],
  "records": [
    {"id": 1, "centroid": {"x": 0.0, "y": 0.0}, "footprint_area": 25,
     "values": {"base_PsfFlux_instFlux": 100.0, "base_PsfFlux_instFluxErr": 4.0,
                "base_GaussianFlux_instFlux": 100.0, "base_GaussianFlux_instFluxErr": 4.0,
                "ext_CModel_instFlux": 80.0, "ext_CModel_instFluxErr": 2.0}},
    {"id": 2, "centroid": {"x": 10.0, "y": -10.0}, "footprint_area": 30,
     "values": {"base_PsfFlux_instFlux": null, "base_PsfFlux_instFluxErr": 4.0,
                "base_GaussianFlux_instFlux": 100.0, "base_GaussianFlux_instFluxErr": 4.0,
                "ext_CModel_instFlux": 80.0, "ext_CModel_instFluxErr": 2.0}}
  ]
}"#;

    // PSF: 1.0 + 0.1 x over [-10, 10]; Gaussian: constant 1.25
    const MAP: &str = r#"{
  "fields": {
    "base_PsfFlux_instFlux": {
      "kind": "chebyshev",
      "bbox": {"min_x": -10.0, "min_y": -10.0, "max_x": 10.0, "max_y": 10.0},
      "coefficients": [[1.0, 0.1]]
    },
    "base_PsfFlux_instFluxErr": {
      "kind": "constant",
      "bbox": {"min_x": -10.0, "min_y": -10.0, "max_x": 10.0, "max_y": 10.0},
      "value": 0.0
    },
    "base_GaussianFlux_instFlux": {
      "kind": "constant",
      "bbox": {"min_x": -10.0, "min_y": -10.0, "max_x": 10.0, "max_y": 10.0},
      "value": 1.25
    },
    "base_GaussianFlux_instFluxErr": {
      "kind": "constant",
      "bbox": {"min_x": -10.0, "min_y": -10.0, "max_x": 10.0, "max_y": 10.0},
      "value": 0.0
    }
  }
}"#;

    fn float(document: &CatalogDocument, id: u64, field: &str) -> Option<f64> {
        let record = document.records.iter().find(|r| r.id == id).unwrap();
        match record.values.get(field).copied().flatten() {
            Some(FieldValue::Float(v)) => Some(v),
            Some(FieldValue::Int(v)) => Some(v as f64),
            _ => None,
        }
    }

    fn flag(document: &CatalogDocument, id: u64, field: &str) -> bool {
        let record = document.records.iter().find(|r| r.id == id).unwrap();
        record.values.get(field).copied().flatten() == Some(FieldValue::Flag(true))
    }

    #[test]
    fn test_document_round_trip_through_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("in.json");
        let map_path = dir.path().join("map.json");
        let output_path = dir.path().join("out.json");
        std::fs::File::create(&catalog_path)
            .unwrap()
            .write_all(CATALOG.as_bytes())
            .unwrap();
        std::fs::write(&map_path, MAP).unwrap();

        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let document = CatalogLoader::load_from_path(&catalog_path).unwrap();
        let map = ApCorrMapLoader::load_from_path(&map_path).unwrap();

        let mut schema = document.build_schema().unwrap();
        let names = ApCorrNameSet::from_names(&blueprint.ap_corr_names);
        let ap_corr =
            ApplyApCorrTask::new(&mut schema, &names, blueprint.apply_ap_corr.clone()).unwrap();
        let registry = PluginRegistry::with_builtin_plugins().unwrap();
        let mut calculation =
            CatalogCalculationTask::new(&mut schema, &registry, &blueprint.catalog_calculation)
                .unwrap();

        let mut catalog = document.fill(SourceCatalog::new(schema)).unwrap();
        ap_corr.run(&mut catalog, &map);
        calculation.run(&mut catalog).unwrap();

        CatalogLoader::write_to_path(&CatalogDocument::from_catalog(&catalog).unwrap(), &output_path)
            .unwrap();
        let output = CatalogLoader::load_from_path(&output_path).unwrap();

        // Proxy columns are written as aliases, not as fields
        assert_eq!(
            output.aliases.get("ext_CModel_apCorr").map(String::as_str),
            Some("base_GaussianFlux_apCorr")
        );
        assert!(!output.fields.iter().any(|f| f.name == "ext_CModel_apCorr"));
        assert!(output.fields.iter().any(|f| f.name == "ext_CModel_flag_apCorr"));

        // Record 1 at x = 0: PSF correction 1.0
        assert_eq!(float(&output, 1, "base_PsfFlux_instFlux"), Some(100.0));
        assert_eq!(float(&output, 1, "base_GaussianFlux_instFlux"), Some(125.0));
        assert_eq!(float(&output, 1, "ext_CModel_instFlux"), Some(100.0));
        assert_eq!(float(&output, 1, "base_ClassificationExtendedness_value"), Some(1.0));
        assert_eq!(float(&output, 1, "base_FootprintArea_value"), Some(25.0));

        // Record 2 at x = 10: PSF correction 1.1, but the PSF flux is NaN
        let psf_ap_corr = float(&output, 2, "base_PsfFlux_apCorr").unwrap();
        assert!((psf_ap_corr - 1.1).abs() < 1e-12);
        assert_eq!(float(&output, 2, "base_PsfFlux_instFlux"), None);
        assert!(flag(&output, 2, "base_ClassificationExtendedness_flag"));
        assert!(!flag(&output, 2, "base_PsfFlux_flag_apCorr"));
    }

    #[test]
    fn test_reloaded_output_keeps_aliases_resolvable() {
        let document = CatalogLoader::load_from_str(CATALOG).unwrap();
        let mut schema = document.build_schema().unwrap();
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let names = ApCorrNameSet::from_names(&blueprint.ap_corr_names);
        ApplyApCorrTask::new(&mut schema, &names, blueprint.apply_ap_corr).unwrap();
        let catalog = document.fill(SourceCatalog::new(schema)).unwrap();

        let snapshot = CatalogDocument::from_catalog(&catalog).unwrap();
        let rebuilt = snapshot.build_schema().unwrap();

        assert_eq!(
            rebuilt.find::<f64>("ext_CModel_apCorrErr").unwrap(),
            rebuilt.find::<f64>("base_GaussianFlux_apCorrErr").unwrap()
        );
    }
}
