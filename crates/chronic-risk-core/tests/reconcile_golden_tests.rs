//! Golden tests for the schema reconciler and feature encoder.
//!
//! These tests verify alignment and encoding against known records.

use chronic_risk_core::encoder::encode;
use chronic_risk_core::models::{
    AttributeValue, CategoricalColumn, NumericColumn, PatientRecord, PreprocessingSchema,
    Resolution,
};
use chronic_risk_core::reconcile::{align, Reconciler};
use proptest::prelude::*;

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    input: &'static str,
    column: &'static str,
    expected: AttributeValue,
    expected_resolution: Resolution,
}

fn training_schema() -> PreprocessingSchema {
    PreprocessingSchema::new(
        vec![
            NumericColumn { name: "Age".into(), mean: 50.0, scale: 10.0 },
            NumericColumn { name: "Systolic_BP".into(), mean: 130.0, scale: 15.0 },
            NumericColumn { name: "Diastolic_BP".into(), mean: 80.0, scale: 10.0 },
            NumericColumn { name: "Physical_Activity".into(), mean: 1.0, scale: 1.0 },
            NumericColumn { name: "Sleep_Hours".into(), mean: 7.0, scale: 1.0 },
            NumericColumn { name: "TC_HDL_Ratio".into(), mean: 4.0, scale: 1.0 },
        ],
        vec![
            CategoricalColumn::drop_first("Gender", vec!["female".into(), "male".into()]),
            CategoricalColumn::drop_first("Smoking", vec!["no".into(), "yes".into()]),
            CategoricalColumn::drop_first(
                "BMI_Category",
                vec!["Normal".into(), "Obese".into(), "Overweight".into(), "Underweight".into()],
            ),
            CategoricalColumn::drop_first(
                "Age_Group",
                vec!["Middle".into(), "Senior".into(), "Young".into()],
            ),
        ],
    )
    .unwrap()
}

fn derived(rule: &str) -> Resolution {
    Resolution::Derived { rule: rule.into() }
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "exact-numeric",
            input: r#"{"Age": 55}"#,
            column: "Age",
            expected: AttributeValue::Number(55.0),
            expected_resolution: Resolution::Exact,
        },
        GoldenCase {
            id: "spaced-name",
            input: r#"{"Physical Activity": "low"}"#,
            column: "Physical_Activity",
            expected: AttributeValue::Text("low".into()),
            expected_resolution: Resolution::Normalized { source: "Physical Activity".into() },
        },
        GoldenCase {
            id: "camel-case-name",
            input: r#"{"SleepHours": 6.5}"#,
            column: "Sleep_Hours",
            expected: AttributeValue::Number(6.5),
            expected_resolution: Resolution::Normalized { source: "SleepHours".into() },
        },
        GoldenCase {
            id: "form-field-alias",
            input: r#"{"sleep": 5}"#,
            column: "Sleep_Hours",
            expected: AttributeValue::Number(5.0),
            expected_resolution: derived("alias:sleep"),
        },
        GoldenCase {
            id: "bp-rename",
            input: r#"{"Systolic": 145}"#,
            column: "Systolic_BP",
            expected: AttributeValue::Number(145.0),
            expected_resolution: derived("alias:systolic"),
        },
        GoldenCase {
            id: "bp-split",
            input: r#"{"Blood Pressure": "138/88"}"#,
            column: "Diastolic_BP",
            expected: AttributeValue::Number(88.0),
            expected_resolution: derived("blood_pressure:diastolic"),
        },
        GoldenCase {
            id: "bmi-obese",
            input: r#"{"BMI": 32}"#,
            column: "BMI_Category",
            expected: AttributeValue::Text("Obese".into()),
            expected_resolution: derived("bmi_category"),
        },
        GoldenCase {
            id: "bmi-edge-right-inclusive",
            input: r#"{"BMI": 25}"#,
            column: "BMI_Category",
            expected: AttributeValue::Text("Normal".into()),
            expected_resolution: derived("bmi_category"),
        },
        GoldenCase {
            id: "bmi-out-of-range",
            input: r#"{"BMI": 140}"#,
            column: "BMI_Category",
            expected: AttributeValue::Text("Normal".into()),
            expected_resolution: Resolution::Defaulted,
        },
        GoldenCase {
            id: "age-group-young",
            input: r#"{"Age": 40}"#,
            column: "Age_Group",
            expected: AttributeValue::Text("Young".into()),
            expected_resolution: derived("age_group"),
        },
        GoldenCase {
            id: "age-group-senior",
            input: r#"{"Age": 72}"#,
            column: "Age_Group",
            expected: AttributeValue::Text("Senior".into()),
            expected_resolution: derived("age_group"),
        },
        GoldenCase {
            id: "ratio-placeholder",
            input: r#"{"Cholesterol": 200}"#,
            column: "TC_HDL_Ratio",
            expected: AttributeValue::Number(4.0),
            expected_resolution: derived("tc_hdl_ratio"),
        },
        GoldenCase {
            id: "ratio-ignores-hdl",
            input: r#"{"Cholesterol": 200, "HDL": 40}"#,
            column: "TC_HDL_Ratio",
            expected: AttributeValue::Number(4.0),
            expected_resolution: derived("tc_hdl_ratio"),
        },
        GoldenCase {
            id: "gender-code",
            input: r#"{"Gender": 1}"#,
            column: "Gender",
            expected: AttributeValue::Text("male".into()),
            expected_resolution: Resolution::Exact,
        },
        GoldenCase {
            id: "gender-case",
            input: r#"{"gender": "FEMALE"}"#,
            column: "Gender",
            expected: AttributeValue::Text("female".into()),
            expected_resolution: Resolution::Normalized { source: "gender".into() },
        },
        GoldenCase {
            id: "smoking-bool",
            input: r#"{"Smoking": true}"#,
            column: "Smoking",
            expected: AttributeValue::Text("yes".into()),
            expected_resolution: Resolution::Exact,
        },
        GoldenCase {
            id: "missing-categorical",
            input: r#"{}"#,
            column: "Smoking",
            expected: AttributeValue::Text("no".into()),
            expected_resolution: Resolution::Defaulted,
        },
        GoldenCase {
            id: "null-is-missing",
            input: r#"{"Age": null}"#,
            column: "Age",
            expected: AttributeValue::Number(0.0),
            expected_resolution: Resolution::Defaulted,
        },
    ]
}

#[test]
fn test_golden_cases() {
    let schema = training_schema();
    let reconciler = Reconciler::new(&schema);

    for case in get_golden_cases() {
        let record = PatientRecord::from_json(case.input).unwrap();
        let (row, report) = reconciler.align_with_report(&record);

        assert_eq!(
            row.get(case.column),
            Some(&case.expected),
            "Case {}: value mismatch",
            case.id
        );
        assert_eq!(
            report.resolution(case.column),
            Some(&case.expected_resolution),
            "Case {}: resolution mismatch",
            case.id
        );
        assert_eq!(
            row.len(),
            schema.column_count(),
            "Case {}: aligned row must cover every column",
            case.id
        );
    }
}

#[test]
fn test_encoded_layout() {
    let schema = training_schema();
    let record = PatientRecord::from_json(
        r#"{"Age": 60, "Systolic": 145, "Diastolic": 95, "activity": "high",
            "Sleep_Hours": 5, "Cholesterol": 250, "Gender": "male",
            "Smoking": "no", "BMI": 27}"#,
    )
    .unwrap();

    let matrix = encode(&align(&record, &schema), &schema);

    assert_eq!(matrix.width(), schema.encoded_width());
    assert_eq!(
        matrix.row(),
        &[
            1.0,  // Age (60 - 50) / 10
            1.0,  // Systolic_BP (145 - 130) / 15
            1.5,  // Diastolic_BP (95 - 80) / 10
            1.0,  // Physical_Activity high → 2
            -2.0, // Sleep_Hours
            1.0,  // TC_HDL_Ratio 250 / 50
            1.0,  // Gender=male
            0.0,  // Smoking=yes
            0.0, 1.0, 0.0, // BMI_Category Obese, Overweight, Underweight
            0.0, 0.0, // Age_Group Senior, Young (60 is Middle)
        ]
    );
}

#[test]
fn test_unknown_category_encodes_all_zero() {
    let schema = training_schema();
    let record = PatientRecord::new().with("Gender", "unspecified");
    let row = align(&record, &schema);
    assert_eq!(row.get("Gender"), Some(&AttributeValue::Text("unspecified".into())));

    let matrix = encode(&row, &schema);
    // Gender indicator follows the six numeric columns
    assert_eq!(matrix.row()[6], 0.0);
}

fn attribute_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        any::<bool>().prop_map(AttributeValue::Bool),
        (-500.0f64..500.0).prop_map(AttributeValue::Number),
        prop::sample::select(vec![
            "male", "Female", "yes", "no", "low", "high", "Obese", "senior", "120/80", "n/a", "",
        ])
        .prop_map(AttributeValue::from),
    ]
}

fn attribute_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Age", "age", "Systolic", "Systolic_BP", "diastolic bp", "Blood_Pressure", "BMI",
        "bmi", "Cholesterol", "HDL", "Gender", "SEX", "Smoking", "activity", "sleep",
        "Sleep Hours", "Age_Group", "bmi-category", "Unrelated",
    ])
    .prop_map(str::to_string)
}

fn patient_record() -> impl Strategy<Value = PatientRecord> {
    prop::collection::vec((attribute_name(), attribute_value()), 0..12)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_alignment_is_idempotent(record in patient_record()) {
        let schema = training_schema();
        let once = align(&record, &schema);
        let twice = align(&once.to_record(), &schema);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_aligned_row_matches_schema(record in patient_record()) {
        let schema = training_schema();
        let row = align(&record, &schema);
        let names: Vec<_> = row.column_names().collect();
        let expected: Vec<_> = schema.column_names().collect();
        prop_assert_eq!(names, expected);
        prop_assert_eq!(encode(&row, &schema).width(), schema.encoded_width());
    }

    #[test]
    fn prop_reference_category_encodes_all_zero(
        gender in prop::sample::select(vec!["female", "FEMALE", " Female "]),
        age in 18.0f64..90.0,
    ) {
        let schema = training_schema();
        let record = PatientRecord::new().with("Gender", gender).with("Age", age);
        let matrix = encode(&align(&record, &schema), &schema);
        prop_assert_eq!(matrix.row()[6], 0.0);
    }
}
