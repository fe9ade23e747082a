use nalgebra::{Point3, Vector3};
use primview_core::helpers::Helper;
use primview_core::{
    create_edges, create_geometry_instances, create_group, create_instances, demos, primitives,
    Color, Container, HeadlessContainer, MeshMaterial, Object3D, ObjectKind,
};

#[test]
fn test_aspect_follows_container() {
    let mut container = HeadlessContainer::new(800, 600);
    let instances = create_instances(&mut container, true).unwrap();
    assert!((instances.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(instances.camera.fov, 75.0);
    assert_eq!(instances.renderer.size(), (800, 600));
    assert!(instances.renderer.antialias());
}

#[test]
fn test_scene_children_per_variant() {
    let mut container = HeadlessContainer::new(64, 48);

    let geometry = create_geometry_instances(&mut container).unwrap();
    assert_eq!(geometry.scene.len(), 5);
    let names: Vec<_> = geometry
        .scene
        .children()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, ["grid", "axis-x", "axis-y", "axis-z", "light"]);

    let with_grid = create_instances(&mut container, true).unwrap();
    assert_eq!(with_grid.scene.len(), 1);
    assert!(matches!(
        with_grid.scene.children()[0].kind,
        ObjectKind::Helper(_)
    ));

    let bare = create_instances(&mut container, false).unwrap();
    assert!(bare.scene.is_empty());
}

#[test]
fn test_one_canvas_per_call_and_dispose_detaches() {
    let mut container = HeadlessContainer::new(64, 48);
    let first = create_instances(&mut container, true).unwrap();
    assert_eq!(container.child_count(), 1);
    let second = create_instances(&mut container, true).unwrap();
    assert_eq!(container.child_count(), 2);

    first.dispose();
    assert_eq!(container.child_count(), 1);
    drop(second);
    assert_eq!(container.child_count(), 0);
}

#[test]
fn test_instances_are_independent() {
    let mut wide = HeadlessContainer::new(64, 48);
    let mut tall = HeadlessContainer::new(30, 90);
    let mut first = create_instances(&mut wide, true).unwrap();
    let second = create_instances(&mut tall, true).unwrap();

    assert_eq!(wide.child_count(), 1);
    assert_eq!(tall.child_count(), 1);
    assert_eq!(first.renderer.size(), (64, 48));
    assert_eq!(second.renderer.size(), (30, 90));
    assert!(first.camera.aspect > 1.0);
    assert!(second.camera.aspect < 1.0);

    first.scene.add(Object3D::group().with_name("extra"));
    first.camera.set_position(1.0, 2.0, 3.0);

    assert_eq!(first.scene.len(), 2);
    assert_eq!(second.scene.len(), 1);
    assert_ne!(first.camera.position, second.camera.position);

    first.dispose();
    assert_eq!(wide.child_count(), 0);
    assert_eq!(tall.child_count(), 1);
}

#[test]
fn test_bootstrap_fixed_parameters() {
    let mut container = HeadlessContainer::new(64, 48);
    let instances = create_geometry_instances(&mut container).unwrap();

    let camera = &instances.camera;
    assert_eq!(camera.position, Point3::new(0.0, 40.0, 80.0));
    assert_eq!(camera.target, Point3::origin());
    assert_eq!((camera.fov, camera.near, camera.far), (75.0, 0.1, 1000.0));
    assert_eq!(instances.renderer.clear_color(), (Color::from_hex(0x222842), 1.0));
    assert!(!instances.controls.auto_rotate);
    assert_eq!(instances.controls.target, Point3::origin());

    let children = instances.scene.children();
    let ObjectKind::Helper(Helper::Grid(grid)) = &children[0].kind else {
        panic!("first child is not a grid");
    };
    assert_eq!((grid.size, grid.divisions), (100.0, 20));

    let axes = [
        (Vector3::x(), Color::RED),
        (Vector3::y(), Color::YELLOW),
        (Vector3::z(), Color::BLUE),
    ];
    for (child, (direction, color)) in children[1..4].iter().zip(axes) {
        let ObjectKind::Helper(Helper::Arrow(arrow)) = &child.kind else {
            panic!("{} is not an arrow", child.name);
        };
        assert!((arrow.direction - direction).norm() < 1e-6);
        assert_eq!(arrow.origin, Point3::origin());
        assert_eq!(arrow.color, color);
        assert_eq!((arrow.length, arrow.head_length), (55.0, 4.0));
    }

    let ObjectKind::Light(light) = &children[4].kind else {
        panic!("last child is not a light");
    };
    assert_eq!(light.intensity, 1.0);
    assert_eq!(light.color, Color::WHITE);
    assert_eq!(children[4].transform.position, Vector3::new(0.0, 100.0, 500.0));
}

#[test]
fn test_render_draws_over_clear_color() {
    let mut container = HeadlessContainer::new(80, 60);
    let mut instances = create_geometry_instances(&mut container).unwrap();
    let geometry = primitives::box_geometry(20.0, 20.0, 20.0);
    let edges = create_edges(&geometry);
    instances.scene.add(create_group([
        Object3D::mesh(geometry, MeshMaterial::lambert(Color::from_hex(0x3d89e0))),
        edges,
    ]));
    instances.render().unwrap();

    let frame = instances.renderer.frame();
    assert_eq!((frame.width(), frame.height()), (80, 60));
    let background = Color::from_hex(0x222842);
    let drawn = (0..frame.height())
        .flat_map(|y| (0..frame.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.pixel_color(x, y) != Some(background))
        .count();
    assert!(drawn > 0);
    assert!(instances.renderer.info().triangles > 0);
    assert!(instances.renderer.info().lines > 0);
}

#[test]
fn test_zero_area_container_still_bootstraps() {
    let mut container = HeadlessContainer::new(0, 0);
    let mut instances = create_instances(&mut container, true).unwrap();
    assert_eq!(instances.camera.aspect, 1.0);
    instances.render().unwrap();
    assert!(instances.renderer.frame().is_empty());
}

#[test]
fn test_every_demo_bootstraps_and_renders() {
    for demo in demos::catalog() {
        let mut container = HeadlessContainer::new(40, 30);
        let mut instances = demo.bootstrap(&mut container).unwrap();
        assert!(
            instances.scene.len() > demo.variant.options().helper_count(),
            "{} added nothing",
            demo.path
        );
        instances.update(1.0 / 30.0);
        instances.render().unwrap();
        assert_eq!(container.offset_width(), 40);
    }
}
