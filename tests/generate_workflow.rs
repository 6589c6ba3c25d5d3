//! Generate Workflow Tests
//!
//! End-to-end runs of record generation and parameter maintenance on a
//! temporary process directory, with scripted answers standing in for the
//! terminal.

use std::fs;
use std::path::Path;

use geopublish::config::{apply_edit, ConfigKey, GLOBAL_FILE_NAME};
use geopublish::generate::{GenerateError, GenerateOptions, Generator};
use geopublish::params;
use geopublish::{
    ConfigResolver, ConfigTier, KeyValues, NameRules, PublishRecord, ScriptedPrompter, TierKind,
};
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"raster").unwrap();
}

/// Resolver with the global tier loaded from `content`
fn resolver_with_global(dir: &TempDir, content: &str) -> ConfigResolver {
    let global_path = dir.path().join(GLOBAL_FILE_NAME);
    fs::write(&global_path, content).unwrap();
    let global = ConfigTier::load(TierKind::Global, &global_path).unwrap();
    let session = ConfigTier::load_session(&dir.path().join("rasters")).unwrap();
    ConfigResolver::new(session, global)
}

fn process_dir(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("rasters");
    fs::create_dir_all(&path).unwrap();
    path
}

// =============================================================================
// Generate
// =============================================================================

#[test]
fn test_generate_writes_session_and_records() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    touch(&rasters, "PM10_2010.tif");
    touch(&rasters, "NO2_2010.asc");
    touch(&rasters, "bad name.tif");
    touch(&rasters, "readme.txt");

    let resolver = resolver_with_global(
        &dir,
        "coverage.keywords=environment\ncoveragestore.workspace=rivm\nlayer.style=raster\n",
    );
    // store description, abstract, description, keywords, host, instance, user, root dir
    let mut prompter = ScriptedPrompter::new([
        "Air quality grids",
        "Yearly averages",
        "",
        "+,health",
        "localhost:8080",
        "/geoserver",
        "admin",
        "/srv/",
    ]);
    let mut options = GenerateOptions::new(&rasters);
    options.names = NameRules {
        strip_patterns: vec!["_2010".to_string()],
        store_prefix: "lucht".to_string(),
        coverage_prefix: String::new(),
    };
    let mut generator = Generator::new(options, resolver, &mut prompter);
    let records = generator.run().unwrap();
    assert_eq!(records.len(), 2, "space and unknown type are skipped");

    assert_eq!(
        fs::read_to_string(rasters.join("config.session")).unwrap(),
        "coveragestore.description=Air quality grids
coverage.description=Yearly averages
coverage.abstract=Yearly averages
coverage.keywords=environment,health
geoserver.host=localhost:8080
geoserver.instance=/geoserver
geoserver.user=admin
geoserver.coveragerootdir=/srv/
"
    );

    let pm10 = PublishRecord::load(&rasters.join("PM10_2010.gpd")).unwrap();
    assert_eq!(pm10.get("coveragestore.workspace"), Some("rivm"));
    assert_eq!(pm10.get("coveragestore.datatype"), Some("GeoTIFF"));
    assert_eq!(pm10.get("coveragestore.name"), Some("lucht_pm10"));
    assert_eq!(pm10.get("coverage.name"), Some("pm10"));
    assert_eq!(pm10.get("coverage.title"), Some("pm10"));
    assert_eq!(pm10.get("coverage.keywords"), Some("environment,health"));
    assert_eq!(pm10.get("coverage.description"), Some("Yearly averages"));
    assert_eq!(pm10.get("layer.style"), Some("raster"));
    assert_eq!(
        pm10.get("coveragestore.filename"),
        Some(rasters.join("PM10_2010.tif").display().to_string().as_str())
    );

    let no2 = PublishRecord::load(&rasters.join("NO2_2010.gpd")).unwrap();
    assert_eq!(no2.get("coveragestore.datatype"), Some("ArcGrid"));
    assert!(!rasters.join("bad name.gpd").exists());
}

#[test]
fn test_regenerate_keeps_record_values_and_recomputes_names() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    touch(&rasters, "dem.tif");
    fs::write(
        rasters.join("dem.gpd"),
        "coverage.title=Digital elevation\ncoverage.name=old_name\nlayer.style=terrain\n",
    )
    .unwrap();

    let resolver = resolver_with_global(&dir, "layer.style=raster\n");
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let mut options = GenerateOptions::new(&rasters);
    options.workspace = Some("env".to_string());
    let mut generator = Generator::new(options, resolver, &mut prompter);
    generator.run().unwrap();

    let dem = PublishRecord::load(&rasters.join("dem.gpd")).unwrap();
    assert_eq!(dem.get("coverage.title"), Some("Digital elevation"));
    assert_eq!(dem.get("coverage.name"), Some("dem"));
    assert_eq!(dem.get("layer.style"), Some("terrain"));
    assert_eq!(dem.get("coveragestore.workspace"), Some("env"));
}

#[test]
fn test_regenerate_record_with_separator_in_value() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    touch(&rasters, "dem.tif");
    fs::write(
        rasters.join("dem.gpd"),
        "coverage.abstract=NO2 in ug/m3 (threshold=40)\n",
    )
    .unwrap();

    let resolver = resolver_with_global(&dir, "");
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let mut options = GenerateOptions::new(&rasters);
    options.workspace = Some("env".to_string());
    let mut generator = Generator::new(options, resolver, &mut prompter);
    let records = generator.run().unwrap();
    assert_eq!(records.len(), 1);

    let dem = PublishRecord::load(&rasters.join("dem.gpd")).unwrap();
    assert_eq!(dem.get("coverage.abstract"), Some("NO2 in ug/m3 (threshold=40)"));
    assert_eq!(dem.get("coverage.name"), Some("dem"));

    let report =
        params::update_param(&rasters, "*", "coverage.description", ":coverage.abstract", false)
            .unwrap();
    assert_eq!(report, params::ParamReport { changed: 1, skipped: 0 });
    let dem = PublishRecord::load(&rasters.join("dem.gpd")).unwrap();
    assert_eq!(dem.get("coverage.description"), Some("NO2 in ug/m3 (threshold=40)"));
}

#[test]
fn test_missing_workspace_is_error() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    touch(&rasters, "dem.tif");

    let resolver = resolver_with_global(&dir, "");
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let mut generator = Generator::new(GenerateOptions::new(&rasters), resolver, &mut prompter);
    let err = generator.run().unwrap_err();
    assert!(matches!(err, GenerateError::MissingWorkspace(_)));
    assert!(!rasters.join("dem.gpd").exists());
}

// =============================================================================
// Resolver laws
// =============================================================================

#[test]
fn test_append_worked_example() {
    let global = ConfigTier::from_values(
        TierKind::Global,
        [("coverage.keywords", "environment")].into_iter().collect(),
    );
    let resolver = ConfigResolver::new(ConfigTier::empty(TierKind::Session), global);
    let mut prompter = ScriptedPrompter::new(["+,health"]);
    let value = resolver
        .edit_value(&mut prompter, "Coverage keywords", ConfigKey::CoverageKeywords)
        .unwrap();
    assert_eq!(value, "environment,health");
    assert_eq!(apply_edit("A", "+X"), "AX");
}

#[test]
fn test_precedence_across_loaded_tiers() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    fs::write(rasters.join("config.session"), "coverage.title=session\n").unwrap();
    fs::write(rasters.join("dem.gpd"), "coverage.title=record\n").unwrap();

    let mut resolver = resolver_with_global(&dir, "coverage.title=global\nlayer.style=g\n");
    assert_eq!(resolver.resolve(ConfigKey::CoverageTitle), "session");
    assert_eq!(resolver.resolve(ConfigKey::LayerStyle), "g");

    let record = PublishRecord::load(&rasters.join("dem.gpd")).unwrap();
    resolver.set_record_values(record.values().clone());
    assert_eq!(resolver.resolve(ConfigKey::CoverageTitle), "record");
    assert_eq!(resolver.resolve(ConfigKey::CoverageAbstract), "");
}

#[test]
fn test_round_trip_is_byte_stable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dem.gpd");
    let content = "b.key=2\na.key=value with spaces\nempty=\nurl=http://x/?a=b\n";
    fs::write(&path, content).unwrap();

    let values = KeyValues::load(&path).unwrap();
    values.persist(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
    assert_eq!(values.get("url"), Some("http://x/?a=b"));
}

// =============================================================================
// Parameter maintenance
// =============================================================================

#[test]
fn test_reference_update_law() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    fs::write(
        rasters.join("dem.gpd"),
        "coverage.abstract=Heights\ncoverage.description=old\n",
    )
    .unwrap();
    fs::write(
        rasters.join("pm10.gpd"),
        "coverage.abstract=Particles\ncoverage.description=old\n",
    )
    .unwrap();

    let report =
        params::update_param(&rasters, "*", "coverage.description", ":coverage.abstract", false)
            .unwrap();
    assert_eq!(report.changed, 2);

    for (name, abstract_text) in [("dem", "Heights"), ("pm10", "Particles")] {
        let record = PublishRecord::load(&rasters.join(format!("{}.gpd", name))).unwrap();
        assert_eq!(record.get("coverage.description"), Some(abstract_text));
    }

    let shown = params::show_param(&rasters, "pm*", "coverage.description").unwrap();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].line().ends_with(" Particles"));
}

#[test]
fn test_set_param_prompts_per_record() {
    let dir = TempDir::new().unwrap();
    let rasters = process_dir(&dir);
    fs::write(rasters.join("a.gpd"), "layer.style=one\n").unwrap();
    fs::write(rasters.join("b.gpd"), "layer.style=two\n").unwrap();

    let mut prompter = ScriptedPrompter::new(["  uno  ", ""]);
    params::set_param(&rasters, "*", "layer.style", &mut prompter, false).unwrap();

    assert_eq!(fs::read_to_string(rasters.join("a.gpd")).unwrap(), "layer.style=uno\n");
    assert_eq!(fs::read_to_string(rasters.join("b.gpd")).unwrap(), "layer.style=two\n");
    assert_eq!(prompter.asked()[1].1, "two");
}
