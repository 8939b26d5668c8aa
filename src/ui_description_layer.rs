/*
 * This module is responsible for defining the static structure of the UI.
 * It generates a series of `PlatformCommand`s that describe the layout
 * and initial properties of UI elements: the main menu, the folder tree, the
 * preview host and the status line. This decouples the UI definition from the
 * platform-specific implementation.
 */
use crate::app_logic::ui_constants;

use crate::platform_layer::types::{
    DockStyle, LayoutRule, MenuAction, MenuItemConfig, PlatformCommand, WindowId,
};

/*
 * Generates the `PlatformCommand`s that build the main window: the "File" menu,
 * the TreeView docked left, the status label docked at the bottom, and the
 * preview host filling the rest. The last command signals that the static setup
 * is complete, which prompts the application logic to load the startup folder.
 *
 * This function is intended to be called only once per window.
 */
pub fn build_main_window_static_layout(window_id: WindowId) -> Vec<PlatformCommand> {
    log::debug!("ui_description_layer: build_main_window_static_layout called.");

    let mut commands = Vec::new();

    // 1. Menu
    let file_menu_items = vec![
        MenuItemConfig {
            action: Some(MenuAction::OpenFolder),
            text: "&Open Folder...".to_string(),
            children: Vec::new(),
        },
        MenuItemConfig {
            action: Some(MenuAction::Exit),
            text: "E&xit".to_string(),
            children: Vec::new(),
        },
    ];
    commands.push(PlatformCommand::CreateMainMenu {
        window_id,
        menu_items: vec![MenuItemConfig {
            action: None, // Top-level "&File" is a popup, no direct action
            text: "&File".to_string(),
            children: file_menu_items,
        }],
    });

    // 2. Controls
    commands.push(PlatformCommand::CreateTreeView {
        window_id,
        control_id: ui_constants::TREE_VIEW_ID,
    });
    commands.push(PlatformCommand::CreatePreviewHost {
        window_id,
        control_id: ui_constants::PREVIEW_HOST_ID,
    });
    commands.push(PlatformCommand::CreateLabel {
        window_id,
        parent_control_id: None,
        control_id: ui_constants::STATUS_LABEL_ID,
        initial_text: String::new(),
    });

    // 3. Layout. The status line is docked first so it spans the full width.
    let layout_rules = vec![
        LayoutRule {
            control_id: ui_constants::STATUS_LABEL_ID,
            parent_control_id: None,
            dock_style: DockStyle::Bottom,
            order: 0,
            fixed_size: Some(ui_constants::STATUS_BAR_HEIGHT),
            margin: (2, 4, 2, 4),
        },
        LayoutRule {
            control_id: ui_constants::TREE_VIEW_ID,
            parent_control_id: None,
            dock_style: DockStyle::Left,
            order: 1,
            fixed_size: Some(ui_constants::TREE_VIEW_WIDTH),
            margin: (0, 2, 0, 0),
        },
        LayoutRule {
            control_id: ui_constants::PREVIEW_HOST_ID,
            parent_control_id: None,
            dock_style: DockStyle::Fill,
            order: 10,
            fixed_size: None,
            margin: (0, 0, 0, 0),
        },
    ];
    commands.push(PlatformCommand::DefineLayout {
        window_id,
        rules: layout_rules,
    });

    // 4. Hand over to the application logic.
    commands.push(PlatformCommand::SignalMainWindowUISetupComplete { window_id });

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform_layer::layout::{LayoutRect, calculate_layout};

    #[test]
    fn test_layout_creates_each_control_once_and_signals_last() {
        // Arrange
        let window_id = WindowId(1);

        // Act
        let commands = build_main_window_static_layout(window_id);

        // Assert
        let tree_views = commands
            .iter()
            .filter(|c| matches!(c, PlatformCommand::CreateTreeView { control_id, .. } if *control_id == ui_constants::TREE_VIEW_ID))
            .count();
        let preview_hosts = commands
            .iter()
            .filter(|c| matches!(c, PlatformCommand::CreatePreviewHost { control_id, .. } if *control_id == ui_constants::PREVIEW_HOST_ID))
            .count();
        let labels = commands
            .iter()
            .filter(|c| matches!(c, PlatformCommand::CreateLabel { control_id, .. } if *control_id == ui_constants::STATUS_LABEL_ID))
            .count();
        assert_eq!((tree_views, preview_hosts, labels), (1, 1, 1));
        assert_eq!(
            commands.last(),
            Some(&PlatformCommand::SignalMainWindowUISetupComplete { window_id })
        );
    }

    #[test]
    fn test_file_menu_offers_open_folder_and_exit() {
        let commands = build_main_window_static_layout(WindowId(1));

        let menu_items = commands
            .iter()
            .find_map(|c| match c {
                PlatformCommand::CreateMainMenu { menu_items, .. } => Some(menu_items),
                _ => None,
            })
            .expect("A main menu should be created");

        assert_eq!(menu_items.len(), 1);
        assert_eq!(menu_items[0].text, "&File");
        let actions: Vec<Option<MenuAction>> =
            menu_items[0].children.iter().map(|item| item.action).collect();
        assert_eq!(
            actions,
            vec![Some(MenuAction::OpenFolder), Some(MenuAction::Exit)]
        );
    }

    #[test]
    fn test_layout_rules_put_tree_left_and_preview_in_remaining_space() {
        let commands = build_main_window_static_layout(WindowId(1));
        let rules = commands
            .iter()
            .find_map(|c| match c {
                PlatformCommand::DefineLayout { rules, .. } => Some(rules.clone()),
                _ => None,
            })
            .expect("Layout rules should be defined");

        let placements = calculate_layout(&rules, None, LayoutRect::new(0, 0, 1000, 700));
        let rect_of = |id| {
            placements
                .iter()
                .find(|(control_id, _)| *control_id == id)
                .map(|(_, rect)| *rect)
                .unwrap()
        };

        let tree = rect_of(ui_constants::TREE_VIEW_ID);
        let preview = rect_of(ui_constants::PREVIEW_HOST_ID);
        let status = rect_of(ui_constants::STATUS_LABEL_ID);
        assert_eq!(tree.x, 0);
        assert!(preview.x >= tree.x + tree.width, "Preview must be right of the tree.");
        assert_eq!(preview.x + preview.width, 1000);
        assert!(status.y >= tree.y + tree.height, "Status line must be below the tree.");
        assert_eq!(status.y + status.height, 700 - 2);
    }
}
