use std::sync::atomic::{AtomicU8, Ordering};

use crate::measure::{MeasurementKind, Tool};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ru,
    En,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=Ru (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Lang::En,
        _ => Lang::Ru,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::Ru => 0,
            Lang::En => 1,
        },
        Ordering::Relaxed,
    );
}

pub fn kind_label(kind: MeasurementKind) -> &'static str {
    match kind {
        MeasurementKind::Length => t("kind.length"),
        MeasurementKind::Height => t("kind.height"),
        MeasurementKind::Area => t("kind.area"),
    }
}

pub fn tool_label(tool: Tool) -> &'static str {
    match tool {
        Tool::None => t("tool.none"),
        Tool::Length => t("kind.length"),
        Tool::Height => t("kind.height"),
        Tool::Area => t("kind.area"),
    }
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Main menus ──────────────────────────────────────
        "menu.file" => if ru { "Файл" } else { "File" },
        "menu.open_model" => if ru { "Открыть модель..." } else { "Open model..." },
        "menu.open_model_title" => if ru { "Открыть модель OBJ" } else { "Open OBJ model" },
        "menu.demo_site" => if ru { "Демо-площадка" } else { "Demo site" },
        "menu.save_measurements" => if ru { "Сохранить измерения..." } else { "Save measurements..." },
        "menu.load_measurements" => if ru { "Загрузить измерения..." } else { "Load measurements..." },
        "menu.measurements_title" => if ru { "JSON измерений" } else { "Measurements JSON" },
        "menu.export_report" => if ru { "Экспорт отчёта..." } else { "Export report..." },
        "menu.export_report_title" => if ru { "Экспорт отчёта JSON" } else { "Export report JSON" },
        "menu.quit" => if ru { "Выход" } else { "Quit" },

        "menu.edit" => if ru { "Правка" } else { "Edit" },
        "menu.undo_point" => if ru { "Отменить точку  Ctrl+Z" } else { "Undo point  Ctrl+Z" },
        "menu.finish_area" => if ru { "Завершить площадь  Enter" } else { "Finish area  Enter" },
        "menu.cancel_capture" => if ru { "Отменить измерение  Esc" } else { "Cancel measurement  Esc" },
        "menu.clear_all" => if ru { "Удалить все измерения" } else { "Clear all measurements" },

        "menu.view" => if ru { "Вид" } else { "View" },
        "menu.measurements_panel" => if ru { "Панель измерений" } else { "Measurements panel" },
        "menu.reset_camera" => if ru { "Сбросить камеру" } else { "Reset camera" },
        "menu.language" => if ru { "Язык" } else { "Language" },

        "menu.cloud" => if ru { "Облако" } else { "Cloud" },
        "menu.cloud_push" => if ru { "Отправить измерения" } else { "Push measurements" },
        "menu.cloud_pull" => if ru { "Получить измерения" } else { "Pull measurements" },

        "menu.settings" => if ru { "Настройки" } else { "Settings" },
        "menu.preferences" => if ru { "Параметры..." } else { "Preferences..." },

        // ── Tools ───────────────────────────────────────────
        "tool.none" => if ru { "Навигация" } else { "Navigate" },
        "kind.length" => if ru { "Длина" } else { "Length" },
        "kind.height" => if ru { "Высота" } else { "Height" },
        "kind.area" => if ru { "Площадь" } else { "Area" },
        "tb.undo" => if ru { "Отменить точку" } else { "Undo point" },
        "tb.finish" => if ru { "Завершить" } else { "Finish" },
        "tb.clear" => if ru { "Очистить" } else { "Clear" },

        // ── Measurements panel ──────────────────────────────
        "panel.measurements" => if ru { "Измерения" } else { "Measurements" },
        "panel.empty" => if ru { "Нет измерений" } else { "No measurements yet" },
        "panel.description" => if ru { "Описание" } else { "Description" },
        "panel.value" => if ru { "Значение" } else { "Value" },
        "panel.incline" => if ru { "Уклон" } else { "Incline" },
        "panel.visible" => if ru { "Показывать" } else { "Visible" },
        "panel.edit_points" => if ru { "Редактировать точки" } else { "Edit points" },
        "panel.delete" => if ru { "Удалить" } else { "Delete" },
        "panel.points" => if ru { "Точки" } else { "Points" },
        "panel.delete_point" => if ru { "Удалить точку" } else { "Delete point" },
        "panel.capture" => if ru { "Текущее измерение" } else { "Current measurement" },
        "panel.preview" => if ru { "Предпросмотр" } else { "Preview" },

        // ── Status bar ──────────────────────────────────────
        "status.model" => if ru { "Модель" } else { "Model" },
        "status.no_model" => if ru { "Модель не загружена" } else { "No model loaded" },
        "status.triangles" => if ru { "треуг." } else { "tris" },
        "status.measurements" => if ru { "измерений" } else { "measurements" },
        "status.hint_none" => if ru { "ЛКМ: вращение, ПКМ: сдвиг, колесо: масштаб" } else { "LMB: orbit, RMB: pan, wheel: zoom" },
        "status.hint_length" => if ru { "Кликните две точки на модели" } else { "Click two points on the model" },
        "status.hint_height" => if ru { "Кликните две точки: разница по высоте" } else { "Click two points: vertical difference" },
        "status.hint_area" => if ru { "Кликайте вершины; клик по первой точке или Enter замыкает" } else { "Click corners; click the first point or press Enter to close" },
        "status.hint_drag" => if ru { "Перетащите точку по поверхности" } else { "Drag the point across the surface" },

        // ── Viewport ────────────────────────────────────────
        "viewport.no_model" => if ru { "Откройте OBJ-модель через меню Файл" } else { "Open an OBJ model from the File menu" },
        "viewport.no_gl" => if ru { "OpenGL недоступен" } else { "OpenGL is not available" },

        // ── Notices ─────────────────────────────────────────
        "notice.cascade_delete" => if ru {
            "Измерение «{kind}» не может иметь меньше {n} точек и было удалено"
        } else {
            "A {kind} measurement cannot have fewer than {n} points and was deleted"
        },
        "notice.area_min_points" => if ru { "Для площади нужно минимум 3 точки" } else { "An area needs at least 3 points" },
        "notice.model_loaded" => if ru { "Модель загружена" } else { "Model loaded" },
        "notice.model_failed" => if ru { "Не удалось загрузить модель" } else { "Failed to load model" },
        "notice.saved" => if ru { "Измерения сохранены" } else { "Measurements saved" },
        "notice.loaded" => if ru { "Измерения загружены" } else { "Measurements loaded" },
        "notice.exported" => if ru { "Отчёт экспортирован" } else { "Report exported" },
        "notice.io_failed" => if ru { "Ошибка файла" } else { "File error" },
        "notice.autosave_restored" => if ru { "Восстановлены сохранённые измерения" } else { "Restored autosaved measurements" },
        "notice.cloud_pushed" => if ru { "Измерения отправлены" } else { "Measurements pushed" },
        "notice.cloud_pulled" => if ru { "Измерения получены" } else { "Measurements pulled" },
        "notice.cloud_failed" => if ru { "Ошибка синхронизации" } else { "Sync failed" },

        // ── Settings window ────────────────────────────────
        "settings.title" => if ru { "Настройки" } else { "Settings" },
        "settings.grid" => if ru { "Сетка" } else { "Grid" },
        "settings.grid_visible" => if ru { "Показывать сетку" } else { "Show grid" },
        "settings.grid_size" => if ru { "Размер ячейки" } else { "Cell size" },
        "settings.grid_range" => if ru { "Количество линий" } else { "Grid lines" },
        "settings.grid_opacity" => if ru { "Прозрачность" } else { "Opacity" },

        "settings.axes" => if ru { "Оси координат" } else { "Axes" },
        "settings.axes_visible" => if ru { "Показывать оси" } else { "Show axes" },
        "settings.axes_length" => if ru { "Длина стрелок" } else { "Arrow length" },
        "settings.axes_labels" => if ru { "Показывать метки" } else { "Show labels" },

        "settings.viewport" => if ru { "Вьюпорт" } else { "Viewport" },
        "settings.bg_color" => if ru { "Цвет фона" } else { "Background color" },
        "settings.orbit_speed" => if ru { "Скорость вращения" } else { "Orbit speed" },

        "settings.measure" => if ru { "Измерения" } else { "Measuring" },
        "settings.close_threshold" => if ru { "Порог замыкания (м)" } else { "Closing distance (m)" },
        "settings.incline_threshold" => if ru { "Порог уклона (°)" } else { "Incline threshold (°)" },
        "settings.marker_radius" => if ru { "Радиус маркера (м)" } else { "Marker radius (m)" },
        "settings.label_scale" => if ru { "Масштаб подписей" } else { "Label scale" },

        "settings.cloud" => if ru { "Облако" } else { "Cloud" },
        "settings.server_url" => if ru { "Адрес сервера" } else { "Server URL" },
        "settings.project_id" => if ru { "Проект" } else { "Project" },

        "settings.ui" => if ru { "Интерфейс" } else { "Interface" },
        "settings.font_size" => if ru { "Размер шрифта" } else { "Font size" },

        "settings.reset" => if ru { "Сбросить" } else { "Reset" },
        "settings.close" => if ru { "Закрыть" } else { "Close" },

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_keys_translated() {
        for key in ["kind.length", "notice.cascade_delete", "panel.edit_points", "status.hint_area"] {
            assert_ne!(t(key), "???", "missing key {key}");
        }
        assert_eq!(t("no.such.key"), "???");
    }

    #[test]
    fn test_cascade_template_has_placeholders() {
        let text = t("notice.cascade_delete");
        assert!(text.contains("{kind}") && text.contains("{n}"));
    }
}
