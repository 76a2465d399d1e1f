mod common;

use std::sync::Arc;

use devcamper_lib::schema;
use devcamper_lib::{Error, ErrorKind, Filter, RecordId, ResourceController};
use serde_json::json;

use common::{devworks, fields, modern_tech, stores};

fn bootcamps(store: Arc<dyn devcamper_lib::DocumentStore>) -> ResourceController {
    ResourceController::new(store, schema::bootcamps())
}

#[tokio::test]
async fn created_record_round_trips_through_get() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        let input = devworks();

        let created = controller.create(input.clone()).await.expect("create");
        let fetched = controller.get(created.id).await.expect("get");

        assert_eq!(fetched.fields, input, "{label}: fields should round-trip");
        assert_eq!(fetched.id, created.id, "{label}");
    }
}

#[tokio::test]
async fn absent_ids_are_not_found_for_every_operation() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        let missing = RecordId::generate();

        let get = controller.get(missing).await.unwrap_err();
        let update = controller
            .update(missing, fields(json!({"housing": false})))
            .await
            .unwrap_err();
        let delete = controller.delete(missing).await.unwrap_err();

        for err in [get, update, delete] {
            assert_eq!(err.kind(), ErrorKind::NotFound, "{label}: {err}");
            assert!(err.to_string().contains(&missing.to_string()), "{label}");
        }
    }
}

#[tokio::test]
async fn second_delete_is_not_found() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        let created = controller.create(devworks()).await.unwrap();

        controller.delete(created.id).await.expect("first delete");
        let err = controller.delete(created.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "{label}: {err}");
    }
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    for (label, store) in stores() {
        let listed = bootcamps(store).list(Filter::all()).await.unwrap();
        assert!(listed.is_empty(), "{label}");
    }
}

#[tokio::test]
async fn missing_required_field_writes_nothing() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        let mut input = devworks();
        input.remove("description");

        let err = controller.create(input).await.unwrap_err();
        match err {
            Error::Validation { errors } => {
                assert_eq!(errors.len(), 1, "{label}");
                assert_eq!(errors[0].field, "description", "{label}");
            }
            other => panic!("{label}: expected validation error, got {other:?}"),
        }

        let listed = controller.list(Filter::all()).await.unwrap();
        assert!(listed.is_empty(), "{label}: no partial record");
    }
}

#[tokio::test]
async fn update_returns_full_post_update_record() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        let created = controller.create(devworks()).await.unwrap();

        let updated = controller
            .update(created.id, fields(json!({"housing": false, "averageCost": 12000})))
            .await
            .unwrap();

        assert_eq!(updated.get("housing"), Some(&json!(false)), "{label}");
        assert_eq!(updated.get("averageCost"), Some(&json!(12000)), "{label}");
        assert_eq!(updated.get("name"), created.get("name"), "{label}");
        assert_eq!(updated.created_at, created.created_at, "{label}");
    }
}

#[tokio::test]
async fn update_runs_the_same_validation_as_create() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        let created = controller.create(devworks()).await.unwrap();

        let err = controller
            .update(created.id, fields(json!({"address": null, "averageRating": 42})))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Please add an address"), "{label}: {message}");
        assert!(message.contains("Rating can not be more than 10"), "{label}: {message}");

        let unchanged = controller.get(created.id).await.unwrap();
        assert_eq!(unchanged.fields, created.fields, "{label}");
    }
}

#[tokio::test]
async fn list_filters_by_field_equality() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        controller.create(devworks()).await.unwrap();
        controller.create(modern_tech()).await.unwrap();

        let gi = controller
            .list(Filter::from_query_params([("acceptGi", "true")]))
            .await
            .unwrap();
        assert_eq!(gi.len(), 1, "{label}");
        assert_eq!(gi[0].get("name"), Some(&json!("Devworks Bootcamp")));

        let mobile = controller
            .list(Filter::all().eq("careers", "Mobile Development"))
            .await
            .unwrap();
        assert_eq!(mobile.len(), 1, "{label}");
        assert_eq!(mobile[0].get("name"), Some(&json!("ModernTech Bootcamp")));
    }
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    for (label, store) in stores() {
        let controller = bootcamps(store);
        controller.create(devworks()).await.unwrap();
        let err = controller.create(devworks()).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { ref field } if field == "name"), "{label}");
        assert_eq!(err.to_string(), "Duplicate field value entered");
    }
}
