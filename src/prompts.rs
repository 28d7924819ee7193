//! Prompt templates sent to the vision and text providers.
//!
//! Templates use `{name}` placeholders filled with [`fill`]; literal braces
//! never appear in them.

use crate::language::Language;

static ANALYSIS_RU: &str = r#"
Проанализируй что происходит на этом видео ПОЛНОСТЬЮ от начала до конца. Тебе предоставлены кадры из ВСЕГО видео с интервалом {interval} секунд.

ВАЖНО: Анализируй ВСЁ ВИДЕО ЦЕЛИКОМ, включая финальные кадры и концовку.

Структура ответа должна быть:
🎬 **АНАЛИЗ ВИДЕО**

📋 **ОБЩЕЕ ОПИСАНИЕ:**
[Краткое описание ВСЕГО содержания видео от начала до конца]

⏰ **РАСКАДРОВКА ПО ВРЕМЕНИ:**

🕐 **0:00-0:05** - [Описание происходящего]
🕐 **0:05-0:10** - [Описание происходящего]
[и так далее до КОНЦА видео...]

🎯 **КЛЮЧЕВЫЕ МОМЕНТЫ:**
• [Важный момент 1]
• [Важный момент 2]
• [Важный момент 3]

📝 **ЗАКЛЮЧЕНИЕ:**
[Общие выводы о ПОЛНОМ видео, включая развязку и финал]
"#;

static ANALYSIS_EN: &str = r#"
Analyze what is happening in this video from beginning to end. You are given frames from the WHOLE video taken every {interval} seconds; I want to see a storyboard with what is happening over time.

The response structure should be:
🎬 **VIDEO ANALYSIS**

📋 **GENERAL DESCRIPTION:**
[Brief description of video content]

⏰ **TIMELINE BREAKDOWN:**

🕐 **0:00-0:05** - [Description of what's happening]
🕐 **0:05-0:10** - [Description of what's happening]
[and so on until the END of the video...]

🎯 **KEY MOMENTS:**
• [Important moment 1]
• [Important moment 2]
• [Important moment 3]

📝 **CONCLUSION:**
[General conclusions about the video, including the ending]
"#;

static ANALYSIS_ES: &str = r#"
Analiza lo que está pasando en este video de principio a fin. Tienes fotogramas de TODO el video tomados cada {interval} segundos; quiero ver un guión gráfico con lo que está pasando a lo largo del tiempo.

La estructura de respuesta debe ser:
🎬 **ANÁLISIS DE VIDEO**

📋 **DESCRIPCIÓN GENERAL:**
[Breve descripción del contenido del video]

⏰ **DESGLOSE TEMPORAL:**

🕐 **0:00-0:05** - [Descripción de lo que está pasando]
🕐 **0:05-0:10** - [Descripción de lo que está pasando]
[y así sucesivamente hasta el FINAL del video...]

🎯 **MOMENTOS CLAVE:**
• [Momento importante 1]
• [Momento importante 2]
• [Momento importante 3]

📝 **CONCLUSIÓN:**
[Conclusiones generales sobre el video, incluido el final]
"#;

static SCRIPT_RU: &str = r#"
Ты получаешь описание или раскадровку видео о спасении животного.
Твоя задача — превратить это в цельный трогательный рассказ, написанный от третьего лица.

📜 Правила написания:

Только третье лицо. Никаких "я", "мы", "наш". Используй конструкции:
«женщина заметила…», «мужчина подошёл…», «сердце спасателя сжалось…»

Начало — сразу с драмы. Первое предложение должно содержать: кто заметил, кого заметил и что животное было брошено.

Причина беды обязательна: бросила мать, выбросили, потерялось.

Добавь детали внешнего вида: дрожь, худоба, грязь, выпадающая шерсть, воспалённые глаза.

Структура из 5 этапов:
Начало: беда + причина + детали состояния.
Конфликт: недоверие, страх, отказ идти на контакт.
Поворот: первый контакт и забота.
Развитие: восстановление здоровья, рост доверия.
Финал: контраст с началом — напомни, каким несчастным оно было, и покажи, как оно теперь окружено любовью.

Стиль: простая, живая и эмоциональная речь. Образы: «тень самого себя», «искры жизни в глазах», «сердце сжалось».

Длительность видео: {duration}.
Длина текста: примерно {character_count} символов.

Входные данные (описание видео):
{video_description}

📦 Структура ответа

🎙️ **СЦЕНАРИЙ ДЛЯ ОЗВУЧКИ:**
[Цельный рассказ на {character_count} символов]

📺 **ВАРИАНТЫ ЗАГОЛОВКОВ:**
1. [Заголовок 1]
2. [Заголовок 2]
3. [Заголовок 3]

🔑 **КЛЮЧЕВЫЕ СЛОВА:**
1. [Ключевое слово 1]
2. [Ключевое слово 2]
3. [Ключевое слово 3]
"#;

static SCRIPT_EN: &str = r#"
You receive a description or storyboard of a video about animal rescue.
Your task is to turn this into a cohesive touching story, written in third person.

📜 Writing Rules:

Third person only. No "I", "we", "our". Use constructions like:
"the woman noticed...", "the man approached...", "the rescuer's heart sank..."

Begin immediately with drama. The first sentence must contain who noticed, whom they noticed and that the animal was abandoned.

The reason for the trouble is mandatory: the mother abandoned it, it was thrown out, it got lost.

Add details of appearance: trembling, thinness, dirt, fur falling out, inflamed eyes.

5-stage structure:
Beginning: trouble + reason + condition details.
Conflict: distrust, fear, refusal to make contact.
Turning point: first contact and care.
Development: health recovery, growing trust.
Ending: contrast with the beginning, remind how miserable it was and show how it is now surrounded by love.

Style: simple, lively and emotional speech. Images: "shadow of itself", "sparks of life in the eyes", "heart sank".

Video duration: {duration}.
Text length: approximately {character_count} characters.

Input data (video description):
{video_description}

📦 Response Structure

🎙️ **VOICE-OVER SCRIPT:**
[Complete story of {character_count} characters]

📺 **TITLE OPTIONS:**
1. [Title 1]
2. [Title 2]
3. [Title 3]

🔑 **KEYWORDS:**
1. [Keyword 1]
2. [Keyword 2]
3. [Keyword 3]
"#;

static SCRIPT_ES: &str = r#"
Recibes una descripción o guión gráfico de un video sobre rescate de animales.
Tu tarea es convertir esto en una historia conmovedora y cohesiva, escrita en tercera persona.

Reglas de escritura:
1. Historia en tercera persona.
2. Discurso simple, vivo y emocional.
3. Estructura:
   - Inicio: estado severo del animal + primeras emociones del rescatista.
   - Conflicto: el animal no confía en las personas, requiere paciencia.
   - Punto de giro: primer contacto e inicio del tratamiento.
   - Desarrollo: recuperación gradual y crecimiento de la confianza.
   - Final: hogar feliz, amor, promesa de una vida mejor.
4. Enfócate en los sentimientos del rescatista y el drama de la confianza.
5. No renarres el video cuadro por cuadro, escribe una historia completa del destino.
6. Usa imágenes emocionales ("corazón se encogió", "chispas de vida en los ojos", "sombra de sí mismo").

Duración del video: {duration}.
Longitud del texto: aproximadamente {character_count} caracteres.

Datos de entrada (descripción del video):
{video_description}

Dame también tres opciones de título provocativas y 3 palabras clave que coincidan exactamente con el tema del video.

Estructura de respuesta:

🎙️ **GUIÓN DE NARRACIÓN:**
[Guión de historia para narración, aproximadamente {character_count} caracteres]

📺 **OPCIONES DE TÍTULO:**
1. [Título 1]
2. [Título 2]
3. [Título 3]

🔑 **PALABRAS CLAVE:**
1. [Palabra clave 1]
2. [Palabra clave 2]
3. [Palabra clave 3]
"#;

static CORRECTION_RU: &str = r#"
Твой текст содержит {current_length} символов, а нужно {target_min}-{target_max} символов.

{action} этот текст до {target_min}-{target_max} символов, {direction}.

ВАЖНО:
- НЕ меняй стиль и общий смысл
- Сохрани все ключевые моменты и эмоциональность
- Сохрани структуру повествования
- Верни только исправленный текст БЕЗ заголовков и пояснений

Исходный текст:
{original_script}
"#;

static CORRECTION_EN: &str = r#"
Your text contains {current_length} characters, but needs {target_min}-{target_max} characters.

{action} this text to {target_min}-{target_max} characters by {direction}.

IMPORTANT:
- DON'T change style and overall meaning
- Keep all key moments and emotionality
- Preserve narrative structure
- Return only the corrected text WITHOUT headers and explanations

Original text:
{original_script}
"#;

static CORRECTION_ES: &str = r#"
Tu texto contiene {current_length} caracteres, pero necesita {target_min}-{target_max} caracteres.

{action} este texto a {target_min}-{target_max} caracteres {direction}.

IMPORTANTE:
- NO cambies el estilo y significado general
- Mantén todos los momentos clave y emocionalidad
- Preserva la estructura narrativa
- Devuelve solo el texto corregido SIN encabezados y explicaciones

Texto original:
{original_script}
"#;

/// Replaces every `{key}` in `template` with its value.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

pub fn analysis_instruction(language: Language, interval_seconds: f64) -> String {
    let template = match language {
        Language::Ru => ANALYSIS_RU,
        Language::En => ANALYSIS_EN,
        Language::Es => ANALYSIS_ES,
    };
    fill(template, &[("interval", &format!("{interval_seconds}"))])
        .trim()
        .to_string()
}

pub fn script_template(language: Language) -> &'static str {
    match language {
        Language::Ru => SCRIPT_RU,
        Language::En => SCRIPT_EN,
        Language::Es => SCRIPT_ES,
    }
}

pub fn script_system_instruction(language: Language) -> &'static str {
    match language {
        Language::Ru => "Ты профессиональный сценарист для YouTube Shorts. Создаешь душевные и трогательные сценарии для озвучки видео.",
        Language::En => "You are a professional scriptwriter for YouTube Shorts. You create heartfelt and touching scripts for video voice-overs.",
        Language::Es => "Eres un guionista profesional de YouTube Shorts. Creas guiones emotivos y conmovedores para narraciones de video.",
    }
}

/// Direction of a length correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Expand,
    Shorten,
}

impl Adjustment {
    fn action(self, language: Language) -> &'static str {
        match (self, language) {
            (Adjustment::Expand, Language::Ru) => "Расширь",
            (Adjustment::Expand, Language::En) => "Expand",
            (Adjustment::Expand, Language::Es) => "Amplía",
            (Adjustment::Shorten, Language::Ru) => "Сократи",
            (Adjustment::Shorten, Language::En) => "Shorten",
            (Adjustment::Shorten, Language::Es) => "Acorta",
        }
    }

    fn direction(self, language: Language) -> &'static str {
        match (self, language) {
            (Adjustment::Expand, Language::Ru) => "добавив больше эмоциональных деталей",
            (Adjustment::Expand, Language::En) => "adding more emotional details",
            (Adjustment::Expand, Language::Es) => "añadiendo más detalles emocionales",
            (Adjustment::Shorten, Language::Ru) => "убрав избыточные детали",
            (Adjustment::Shorten, Language::En) => "removing excessive details",
            (Adjustment::Shorten, Language::Es) => "eliminando detalles excesivos",
        }
    }
}

pub fn correction_instruction(
    language: Language,
    original_script: &str,
    current_length: usize,
    target_min: usize,
    target_max: usize,
) -> String {
    let adjustment = if current_length < target_min {
        Adjustment::Expand
    } else {
        Adjustment::Shorten
    };
    let template = match language {
        Language::Ru => CORRECTION_RU,
        Language::En => CORRECTION_EN,
        Language::Es => CORRECTION_ES,
    };
    fill(
        template,
        &[
            ("current_length", &current_length.to_string()),
            ("target_min", &target_min.to_string()),
            ("target_max", &target_max.to_string()),
            ("action", adjustment.action(language)),
            ("direction", adjustment.direction(language)),
            ("original_script", original_script),
        ],
    )
    .trim()
    .to_string()
}
