use multiplot_rs::api::{
    DataView, DataViewColumn, DefaultIdentityService, MetadataColumn, RoleName, VisualConfig,
    visual_transform,
};
use multiplot_rs::core::{PrimitiveValue, Viewport, ZoomTransform};
use multiplot_rs::error::ChartError;
use multiplot_rs::interaction::{RenderState, ZoomPhase, apply_zoom};
use proptest::prelude::*;

fn x_column(values: &[f64]) -> DataViewColumn {
    DataViewColumn::new(
        MetadataColumn::new("x", 0).with_role(RoleName::XAxis, None),
        values.iter().copied().map(PrimitiveValue::from).collect(),
    )
}

fn y_column(slot: usize, values: &[f64]) -> DataViewColumn {
    DataViewColumn::new(
        MetadataColumn::new(format!("y{slot}"), slot + 1).with_role(RoleName::YAxis, Some(slot)),
        values.iter().copied().map(PrimitiveValue::from).collect(),
    )
}

fn ascending(len: usize) -> Vec<f64> {
    (1..=len).map(|i| i as f64).collect()
}

proptest! {
    #[test]
    fn one_plot_model_per_y_column(
        plot_count in 1usize..=4,
        values in prop::collection::vec(-1_000.0f64..1_000.0, 2..30)
    ) {
        let x = ascending(values.len());
        let ys = (0..plot_count).map(|slot| y_column(slot, &values)).collect();
        let data_view = DataView::from_columns(vec![x_column(&x)], ys, None);
        let view_model = visual_transform(
            &data_view,
            Viewport::new(800.0, 900.0),
            &DefaultIdentityService,
            &VisualConfig::default(),
        ).expect("view model");

        prop_assert_eq!(view_model.plot_models.len(), plot_count);
        for (i, plot) in view_model.plot_models.iter().enumerate() {
            prop_assert_eq!(plot.plot_id, i);
            prop_assert_eq!(plot.data_points.len(), values.len());
        }
        for pair in view_model.plot_models.windows(2) {
            prop_assert!(pair[1].plot_top > pair[0].plot_top);
        }
    }

    #[test]
    fn any_null_in_the_x_axis_fails(
        len in 2usize..20,
        null_at in 0usize..20
    ) {
        let null_at = null_at % len;
        let mut cells: Vec<PrimitiveValue> =
            ascending(len).into_iter().map(PrimitiveValue::from).collect();
        cells[null_at] = PrimitiveValue::Null;
        let x = DataViewColumn::new(
            MetadataColumn::new("x", 0).with_role(RoleName::XAxis, None),
            cells,
        );
        let data_view = DataView::from_columns(vec![x], vec![y_column(0, &ascending(len))], None);
        let result = visual_transform(
            &data_view,
            Viewport::new(800.0, 600.0),
            &DefaultIdentityService,
            &VisualConfig::default(),
        );
        prop_assert!(
            matches!(result, Err(ChartError::AxisNullValues { ref axis_name }) if axis_name == "x"),
            "expected AxisNullValues for axis x, got {:?}",
            result
        );
    }

    #[test]
    fn legend_pairs_the_shorter_of_x_and_legend(
        x_len in 1usize..20,
        legend_len in 1usize..20
    ) {
        let categories = ["OZE", "GZE", "RAS"];
        let legend = DataViewColumn::new(
            MetadataColumn::new("legend", 5).with_role(RoleName::Legend, None),
            (0..legend_len)
                .map(|i| PrimitiveValue::from(categories[i % categories.len()]))
                .collect(),
        );
        let x = ascending(x_len);
        let data_view = DataView::from_columns(
            vec![x_column(&x), legend],
            vec![y_column(0, &x)],
            None,
        );
        let view_model = visual_transform(
            &data_view,
            Viewport::new(800.0, 600.0),
            &DefaultIdentityService,
            &VisualConfig::default(),
        ).expect("view model");

        let legend = view_model.error_legend.expect("legend");
        prop_assert_eq!(legend.data_points.len(), x_len.min(legend_len));
        prop_assert_eq!(legend.values.len(), legend_len.min(categories.len()));
    }

    #[test]
    fn zoom_factor_stays_within_bounds(
        k in 0.01f64..50.0,
        tx in -2_000.0f64..2_000.0,
        maximum in 1.0f64..20.0
    ) {
        let x = ascending(20);
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let data_view = DataView::from_columns(vec![x_column(&x)], vec![y_column(0, &y)], None);
        let view_model = visual_transform(
            &data_view,
            Viewport::new(800.0, 600.0),
            &DefaultIdentityService,
            &VisualConfig::default(),
        ).expect("view model");
        let state = RenderState::new(&view_model).expect("state");

        let next = apply_zoom(&state, ZoomTransform::new(k, tx, 0.0), &view_model.plot_models, maximum)
            .expect("zoom");
        prop_assert!(next.transform.k >= 1.0);
        prop_assert!(next.transform.k <= maximum);
        // No frame ever ends up translated at the base factor.
        prop_assert!(!(next.transform.k == 1.0 && next.transform.x != 0.0));
        if k <= 1.0 && tx != 0.0 {
            prop_assert_eq!(next.transform, ZoomTransform::IDENTITY);
            prop_assert_eq!(next.phase, ZoomPhase::Idle);
            prop_assert_eq!(next.x_scale, state.base_x);
            prop_assert_eq!(&next.y_scales, &state.y_scales);
        }
        prop_assert_eq!(next.y_scales.len(), 1);
        // The pinned minimum survives every zoom.
        prop_assert_eq!(next.y_scales[0].domain().0, 0.0);
    }

    #[test]
    fn rebuilding_from_the_same_input_is_stable(
        values in prop::collection::vec(prop::option::of(-100.0f64..100.0), 2..25)
    ) {
        let x = ascending(values.len());
        let y = DataViewColumn::new(
            MetadataColumn::new("y", 1).with_role(RoleName::YAxis, Some(0)),
            values.iter().copied().map(PrimitiveValue::from).collect(),
        );
        let data_view = DataView::from_columns(vec![x_column(&x)], vec![y], None);
        let build = || visual_transform(
            &data_view,
            Viewport::new(800.0, 600.0),
            &DefaultIdentityService,
            &VisualConfig::default(),
        );
        let first = build().expect("first");
        let second = build().expect("second");
        prop_assert_eq!(first, second);
    }
}
