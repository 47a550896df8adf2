//! Integration test: read and write ensemble fields through an in-memory store.
//!
//! Each test stages a small EC-style file in a `MemoryStore`, opens it as an
//! `EnsembleFile` and checks the decoded fields against the raw values.

use ensemble_field::{
    ArrayStore, EnsembleFile, ErrorClass, Field, FieldConfig, FieldError, FieldSet, MemoryStore,
    MissingValue, NameTable, VariableKind, NC_FILL_FLOAT,
};
use test_utils::grid::{EnsembleGridSpec, NARROW_3X7, SIMPLE_10X10};
use test_utils::names::{
    ALTITUDE, CLOUD, ENSEMBLE, FIELD_DIMS, LATITUDE, LONGITUDE, PRECIPITATION, TEMPERATURE, TIME,
};
use test_utils::{
    assert_approx_eq, create_constant_block, create_index_block, create_temperature_block,
    packing,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Dimensions and coordinate variables of an EC ensemble file.
fn ec_skeleton(spec: &EnsembleGridSpec) -> MemoryStore {
    let elevation: Vec<f32> = (0..spec.n_lat * spec.n_lon).map(|i| i as f32 * 10.0).collect();
    MemoryStore::new("memory://ec_ens.nc")
        .with_dimension(TIME, spec.n_time)
        .unwrap()
        .with_dimension(ENSEMBLE, spec.n_ens)
        .unwrap()
        .with_dimension(LATITUDE, spec.n_lat)
        .unwrap()
        .with_dimension(LONGITUDE, spec.n_lon)
        .unwrap()
        .with_variable(LATITUDE, &[LATITUDE], spec.latitudes())
        .unwrap()
        .with_variable(LONGITUDE, &[LONGITUDE], spec.longitudes())
        .unwrap()
        .with_variable(ALTITUDE, &[LATITUDE, LONGITUDE], elevation)
        .unwrap()
}

/// Add a packed `(time, ensemble, lat, lon)` variable.
fn with_packed(
    store: MemoryStore,
    name: &str,
    raw: Vec<f32>,
    (scale, offset, sentinel): (f32, f32, f32),
) -> MemoryStore {
    store
        .with_variable(name, &FIELD_DIMS, raw)
        .unwrap()
        .with_attribute(name, "scale_factor", scale)
        .unwrap()
        .with_attribute(name, "add_offset", offset)
        .unwrap()
        .with_attribute(name, "_FillValue", sentinel)
        .unwrap()
}

fn repeat_blocks(block: Vec<f32>, n_time: usize) -> Vec<f32> {
    let mut raw = Vec::with_capacity(block.len() * n_time);
    for _ in 0..n_time {
        raw.extend_from_slice(&block);
    }
    raw
}

#[test]
fn test_write_single_value_into_missing_10x10() {
    init_tracing();
    let spec = SIMPLE_10X10;
    let all_missing = vec![-999.0; spec.variable_len()];
    let store = with_packed(ec_skeleton(&spec), TEMPERATURE, all_missing, packing::PLAIN);
    let mut file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let mut field = file.read(VariableKind::Temperature, 0).unwrap();
    assert_eq!(field.count_missing(MissingValue::NAN), spec.block_len());

    field[(5, 2, 0)] = 300.0;
    let mut set = FieldSet::new();
    set.insert(VariableKind::Temperature, 0, field);
    let summary = file.write(&[VariableKind::Temperature], &mut set).unwrap();
    assert_eq!(summary.steps_written, 1);
    assert_eq!(summary.steps_skipped, 1);
    assert!(summary.created.is_empty());

    // Raw layout is (time, ensemble, lat, lon).
    let raw = file
        .store()
        .read_f32(TEMPERATURE, &[0, 0, 5, 2], &[1, 1, 1, 1])
        .unwrap();
    assert_eq!(raw, vec![300.0]);
    let neighbour = file
        .store()
        .read_f32(TEMPERATURE, &[0, 1, 5, 2], &[1, 1, 1, 1])
        .unwrap();
    assert_eq!(neighbour, vec![-999.0]);

    let back = file.read(VariableKind::Temperature, 0).unwrap();
    assert_eq!(back[(5, 2, 0)], 300.0);
    assert!(back[(5, 2, 1)].is_nan());
    assert_eq!(back.count_missing(MissingValue::NAN), spec.block_len() - 1);
}

#[test]
fn test_scaled_values_decode_to_physical_units() {
    let spec = SIMPLE_10X10;
    let raw = create_constant_block(spec.n_ens * spec.n_time, spec.n_lat, spec.n_lon, 50.0);
    let store = with_packed(ec_skeleton(&spec), TEMPERATURE, raw, (0.1, 250.0, -32767.0));
    let file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let field = file.read(VariableKind::Temperature, 1).unwrap();
    for &value in field.as_array() {
        assert_approx_eq!(value, 255.0, 1e-3);
    }
}

#[test]
fn test_block_order_matches_storage() {
    let spec = NARROW_3X7;
    let block = create_index_block(spec.n_ens, spec.n_lat, spec.n_lon);
    let raw = repeat_blocks(block, spec.n_time);
    let store = with_packed(ec_skeleton(&spec), TEMPERATURE, raw, packing::PLAIN);
    let file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let field = file.read(VariableKind::Temperature, 2).unwrap();
    assert_eq!(field.shape(), spec.field_shape());
    for lat in 0..spec.n_lat {
        for lon in 0..spec.n_lon {
            for member in 0..spec.n_ens {
                let expected = (member * 10000 + lat * 100 + lon) as f32;
                assert_eq!(field[(lat, lon, member)], expected);
            }
        }
    }
}

#[test]
fn test_read_is_idempotent() {
    let spec = SIMPLE_10X10;
    let block = create_temperature_block(spec.n_ens, spec.n_lat, spec.n_lon);
    let raw = repeat_blocks(block, spec.n_time);
    let store = with_packed(ec_skeleton(&spec), TEMPERATURE, raw, packing::PLAIN);
    let file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let first = file.read(VariableKind::Temperature, 1).unwrap();
    let second = file.read(VariableKind::Temperature, 1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_lazy_creation_then_read_back() {
    init_tracing();
    let spec = SIMPLE_10X10;
    let mut file = EnsembleFile::open(ec_skeleton(&spec), FieldConfig::default()).unwrap();
    assert!(!file.has_variable(VariableKind::Precipitation));

    let [n_lat, n_lon, n_ens] = spec.field_shape();
    let mut source = |_kind: VariableKind, time: usize| {
        Some(Field::filled(n_lat, n_lon, n_ens, 1.5 * (time + 1) as f32))
    };
    let summary = file
        .write(&[VariableKind::Precipitation], &mut source)
        .unwrap();
    assert_eq!(summary.created, vec![PRECIPITATION.to_string()]);
    assert_eq!(summary.steps_written, spec.n_time);
    assert!(file.has_variable(VariableKind::Precipitation));

    let store = file.store();
    assert_eq!(store.dimension_len("surface"), Some(1));
    assert_eq!(
        store.attribute_f32(PRECIPITATION, "_FillValue").unwrap(),
        Some(NC_FILL_FLOAT)
    );

    for time in 0..spec.n_time {
        let field = file.read(VariableKind::Precipitation, time).unwrap();
        assert_eq!(field.count_missing(MissingValue::NAN), 0);
        assert_eq!(field[(9, 9, 1)], 1.5 * (time + 1) as f32);
    }

    // A second write reuses the variable.
    let summary = file
        .write(&[VariableKind::Precipitation], &mut source)
        .unwrap();
    assert_eq!(summary.reused, vec![PRECIPITATION.to_string()]);
    assert!(summary.created.is_empty());
}

#[test]
fn test_unwritten_steps_of_created_variable_are_missing() {
    let spec = SIMPLE_10X10;
    let mut file = EnsembleFile::open(ec_skeleton(&spec), FieldConfig::default()).unwrap();
    let empty = file.empty_field();
    let mut source = |_kind: VariableKind, time: usize| (time == 1).then(|| empty.clone());

    file.write(&[VariableKind::CloudFraction], &mut source).unwrap();
    assert!(file.store().has_variable(CLOUD));

    let untouched = file.read(VariableKind::CloudFraction, 0).unwrap();
    assert_eq!(untouched.count_missing(MissingValue::NAN), spec.block_len());
}

#[test]
fn test_skipped_step_keeps_earlier_values() {
    let spec = SIMPLE_10X10;
    let mut file = EnsembleFile::open(ec_skeleton(&spec), FieldConfig::default()).unwrap();
    let [n_lat, n_lon, n_ens] = spec.field_shape();

    let mut first = |_kind: VariableKind, _time: usize| Some(Field::filled(n_lat, n_lon, n_ens, 1.0));
    file.write(&[VariableKind::Temperature], &mut first).unwrap();

    let mut second = |_kind: VariableKind, time: usize| {
        (time == 1).then(|| Field::filled(n_lat, n_lon, n_ens, 2.0))
    };
    let summary = file.write(&[VariableKind::Temperature], &mut second).unwrap();
    assert_eq!(summary.steps_written, 1);
    assert_eq!(summary.steps_skipped, 1);

    let kept = file.read(VariableKind::Temperature, 0).unwrap();
    assert_eq!(kept, Field::filled(n_lat, n_lon, n_ens, 1.0));
    let replaced = file.read(VariableKind::Temperature, 1).unwrap();
    assert_eq!(replaced, Field::filled(n_lat, n_lon, n_ens, 2.0));
}

#[test]
fn test_missing_values_survive_packed_roundtrip() {
    let spec = SIMPLE_10X10;
    let raw = vec![0.0; spec.variable_len()];
    let store = with_packed(
        ec_skeleton(&spec),
        TEMPERATURE,
        raw,
        packing::TEMPERATURE_SHORT,
    );
    let mut file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let mut field = file.empty_field();
    field[(0, 0, 0)] = 280.25;
    field[(3, 4, 1)] = 265.5;
    let mut set = FieldSet::new();
    set.insert(VariableKind::Temperature, 0, field.clone());
    file.write(&[VariableKind::Temperature], &mut set).unwrap();

    let (_, _, sentinel) = packing::TEMPERATURE_SHORT;
    let raw = file
        .store()
        .read_f32(TEMPERATURE, &[0, 0, 0, 0], &[1, 1, 1, 2])
        .unwrap();
    assert_eq!(raw[1], sentinel);

    let back = file.read(VariableKind::Temperature, 0).unwrap();
    assert_approx_eq!(back[(0, 0, 0)], 280.25, 1e-2);
    assert_approx_eq!(back[(3, 4, 1)], 265.5, 1e-2);
    assert_eq!(back.count_missing(MissingValue::NAN), spec.block_len() - 2);
}

#[test]
fn test_custom_missing_value_and_names() {
    let spec = NARROW_3X7;
    let missing = MissingValue::new(-1.0e30);
    let config = FieldConfig {
        missing_value: missing,
        variables: NameTable::new().with_name(VariableKind::WindSpeed, "wind_speed_10m"),
        ..FieldConfig::default()
    };
    let mut file = EnsembleFile::open(ec_skeleton(&spec), config).unwrap();

    let empty = file.empty_field();
    assert_eq!(empty.count_missing(missing), spec.block_len());

    let mut field = empty.clone();
    field[(2, 6, 3)] = 12.5;
    let mut source = |_kind: VariableKind, time: usize| (time == 0).then(|| field.clone());
    let summary = file.write(&[VariableKind::WindSpeed], &mut source).unwrap();
    assert_eq!(summary.created, vec!["wind_speed_10m".to_string()]);

    let back = file.read(VariableKind::WindSpeed, 0).unwrap();
    assert_eq!(back[(2, 6, 3)], 12.5);
    assert_eq!(back.count_missing(missing), spec.block_len() - 1);
}

#[test]
fn test_invalid_requests_are_reported() {
    let spec = SIMPLE_10X10;
    let raw = vec![0.0; spec.variable_len()];
    let store = with_packed(ec_skeleton(&spec), TEMPERATURE, raw, packing::PLAIN);
    let mut file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let err = file.read(VariableKind::Pressure, 0).unwrap_err();
    assert!(matches!(
        err,
        FieldError::UnresolvedVariable {
            kind: VariableKind::Pressure,
            ..
        }
    ));

    let err = file.read(VariableKind::Temperature, spec.n_time).unwrap_err();
    assert_eq!(err.class(), ErrorClass::InvalidInput);
    assert!(err.to_string().contains("memory://ec_ens.nc"));

    let mut source = |_kind: VariableKind, _time: usize| -> Option<Field> { None };
    let err = file
        .write(&[VariableKind::RelativeHumidity], &mut source)
        .unwrap_err();
    assert!(matches!(err, FieldError::UnresolvedVariable { .. }));
}

#[test]
fn test_geometry_grids_match_field_shape() {
    let spec = NARROW_3X7;
    let file = EnsembleFile::open(ec_skeleton(&spec), FieldConfig::default()).unwrap();
    let geo = file.geometry();

    assert_eq!(geo.field_shape(), spec.field_shape());
    for grid in [file.latitudes(), file.longitudes(), file.elevations()] {
        assert_eq!(grid.dim(), (spec.n_lat, spec.n_lon));
    }

    let lat = spec.latitudes();
    let lon = spec.longitudes();
    for i in 0..spec.n_lat {
        for j in 0..spec.n_lon {
            assert_eq!(file.latitudes()[[i, j]], lat[i]);
            assert_eq!(file.longitudes()[[i, j]], lon[j]);
        }
    }
    assert_eq!(file.elevations()[[2, 6]], 200.0);
    assert_eq!(
        file.dimension_summary(),
        "time=3, ensemble_member=4, latitude=3, longitude=7"
    );
}

#[test]
fn test_read_grid_checks_size() {
    let spec = SIMPLE_10X10;
    let store = ec_skeleton(&spec)
        .with_variable("land_area_fraction", &[LONGITUDE], vec![1.0; spec.n_lon])
        .unwrap();
    let file = EnsembleFile::open(store, FieldConfig::default()).unwrap();

    let err = file.read_grid("land_area_fraction").unwrap_err();
    match err {
        FieldError::ShapeMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, 100);
            assert_eq!(actual, 10);
        }
        other => panic!("unexpected error: {other}"),
    }

    let altitude = file.read_grid(ALTITUDE).unwrap();
    assert_eq!(&altitude, file.elevations());
}

#[test]
fn test_foreign_store_is_rejected() {
    let store = MemoryStore::new("memory://meps.nc")
        .with_dimension(TIME, 1)
        .unwrap()
        .with_dimension("x", 4)
        .unwrap()
        .with_dimension("y", 4)
        .unwrap();
    assert!(!EnsembleFile::is_valid(&store, &FieldConfig::default()));

    let err = EnsembleFile::open(store, FieldConfig::default()).unwrap_err();
    assert!(matches!(err, FieldError::Schema { .. }));
    assert!(err.to_string().contains("dimension 'ensemble_member'"));
}
